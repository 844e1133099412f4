//! Command history ring buffer.
//!
//! [`History`] keeps the last `K` command lines, each truncated to `M` bytes,
//! in a fixed array. Adding always overwrites the oldest slot once the ring is
//! full. Navigation works like a shell's up/down arrows: [`History::previous`]
//! walks towards older entries, [`History::next`] back towards newer ones.
//!
//! ```rust
//! use heapless::String;
//! use ushell::history::History;
//!
//! let mut history: History<2, 32> = History::new();
//! history.add("ls");
//! history.add("pwd");
//!
//! let mut line: String<32> = String::new();
//! history.previous(&mut line).unwrap();
//! assert_eq!(line, "pwd");
//! history.previous(&mut line).unwrap();
//! assert_eq!(line, "ls");
//! history.previous(&mut line).unwrap();
//! assert_eq!(line, "");
//! ```

#![deny(unsafe_code)]

use crate::error::Error;
use heapless::String;

/// Fixed-capacity ring of `K` lines of at most `M` bytes each.
///
/// The navigation cursor is a gap counted in steps back from the newest slot:
/// `0` sits above the newest entry and `K` sits below the oldest. `previous`
/// returns the first populated slot below the gap, `next` the first one above
/// it, so the two are exact inverses of each other.
#[derive(Debug, Clone)]
pub struct History<const K: usize, const M: usize> {
    slots: [String<M>; K],
    head: usize,
    depth: usize,
}

impl<const K: usize, const M: usize> Default for History<K, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const K: usize, const M: usize> History<K, M> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| String::new()),
            head: 0,
            depth: 0,
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        K
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// Whether no slot is populated.
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|slot| slot.is_empty())
    }

    /// Store `line` in the slot at `head`, overwriting what was there.
    ///
    /// Lines longer than `M` bytes are cut at the last character boundary that
    /// fits. Navigation restarts from the newest entry.
    pub fn add(&mut self, line: &str) {
        if K == 0 {
            return;
        }

        let slot = &mut self.slots[self.head];
        slot.clear();
        for ch in line.chars() {
            if slot.push(ch).is_err() {
                break;
            }
        }

        self.head = (self.head + 1) % K;
        self.depth = 0;
    }

    /// Copy the next older entry into `out`.
    ///
    /// Walks at most `K` slots. When nothing older is populated, `out` is
    /// cleared and the cursor stays put.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - `out` holds the entry, or is empty when history is exhausted
    /// * `Err(Error::Size)` - the entry does not fit in `out`; the cursor is unchanged
    pub fn previous<const N: usize>(&mut self, out: &mut String<N>) -> Result<(), Error> {
        for depth in self.depth..K {
            let slot = &self.slots[self.slot_at(depth)];
            if slot.is_empty() {
                continue;
            }
            copy_out(slot, out)?;
            self.depth = depth + 1;
            return Ok(());
        }
        out.clear();
        Ok(())
    }

    /// Copy the next newer entry into `out`.
    ///
    /// The mirror image of [`previous`](Self::previous).
    pub fn next<const N: usize>(&mut self, out: &mut String<N>) -> Result<(), Error> {
        for depth in (0..self.depth).rev() {
            let slot = &self.slots[self.slot_at(depth)];
            if slot.is_empty() {
                continue;
            }
            copy_out(slot, out)?;
            self.depth = depth;
            return Ok(());
        }
        out.clear();
        Ok(())
    }

    /// Depth of the newest entry starting with `prefix`.
    ///
    /// Depth `0` is the newest slot. `None` means no populated entry matches.
    pub fn find(&self, prefix: &str) -> Option<usize> {
        (0..K).find(|&depth| {
            let slot = &self.slots[self.slot_at(depth)];
            !slot.is_empty() && slot.starts_with(prefix)
        })
    }

    /// Entry at `depth` steps back from the newest slot, if populated.
    pub fn get(&self, depth: usize) -> Option<&str> {
        if depth >= K {
            return None;
        }
        let slot = &self.slots[self.slot_at(depth)];
        (!slot.is_empty()).then_some(slot.as_str())
    }

    /// Iterate over populated entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        (0..K).filter_map(move |depth| self.get(depth))
    }

    /// Empty every slot and reset both cursors.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.clear();
        }
        self.head = 0;
        self.depth = 0;
    }

    fn slot_at(&self, depth: usize) -> usize {
        (self.head + K - 1 - depth) % K
    }
}

fn copy_out<const M: usize, const N: usize>(
    slot: &String<M>,
    out: &mut String<N>,
) -> Result<(), Error> {
    if slot.len() > N {
        return Err(Error::Size);
    }
    out.clear();
    out.push_str(slot).map_err(|_| Error::Size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text<const N: usize>(s: &String<N>) -> &str {
        s.as_str()
    }

    #[test]
    fn test_empty_history_yields_empty() {
        let mut history: History<4, 16> = History::new();
        let mut out: String<16> = String::try_from("junk").unwrap();
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "");
        assert!(history.is_empty());
    }

    #[test]
    fn test_capacity_two_scenario() {
        let mut history: History<2, 16> = History::new();
        history.add("ls");
        history.add("pwd");

        let mut out: String<16> = String::new();
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "pwd");
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "ls");
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "");
    }

    #[test]
    fn test_previous_then_next_round_trip() {
        let mut history: History<3, 16> = History::new();
        history.add("one");
        history.add("two");

        let mut out: String<16> = String::new();
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "two");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "two");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "");
    }

    #[test]
    fn test_next_walks_back_up() {
        let mut history: History<4, 16> = History::new();
        for line in ["a", "b", "c"] {
            history.add(line);
        }
        let mut out: String<16> = String::new();
        for _ in 0..3 {
            history.previous(&mut out).unwrap();
        }
        assert_eq!(text(&out), "a");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "a");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "b");
        history.next(&mut out).unwrap();
        assert_eq!(text(&out), "c");
    }

    #[test]
    fn test_oldest_overwritten() {
        let mut history: History<3, 16> = History::new();
        for line in ["first", "second", "third", "fourth"] {
            history.add(line);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.find("first"), None);
        assert_eq!(history.iter().collect::<heapless::Vec<_, 3>>(), ["fourth", "third", "second"]);
    }

    #[test]
    fn test_add_resets_navigation() {
        let mut history: History<3, 16> = History::new();
        history.add("a");
        history.add("b");
        let mut out: String<16> = String::new();
        history.previous(&mut out).unwrap();
        history.previous(&mut out).unwrap();
        history.add("c");
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "c");
    }

    #[test]
    fn test_truncates_to_slot_width() {
        let mut history: History<2, 4> = History::new();
        history.add("abcdefgh");
        assert_eq!(history.get(0), Some("abcd"));
    }

    #[test]
    fn test_small_output_is_size_error() {
        let mut history: History<2, 16> = History::new();
        history.add("long entry");
        let mut out: String<4> = String::new();
        assert_eq!(history.previous(&mut out), Err(Error::Size));

        // cursor did not move, so a large enough buffer still gets the entry
        let mut big: String<16> = String::new();
        history.previous(&mut big).unwrap();
        assert_eq!(text(&big), "long entry");
    }

    #[test]
    fn test_find_is_explicit() {
        let mut history: History<4, 16> = History::new();
        history.add("led on");
        history.add("status");
        history.add("led off");
        assert_eq!(history.find("led"), Some(0));
        assert_eq!(history.find("sta"), Some(1));
        assert_eq!(history.find("reboot"), None);
    }

    #[test]
    fn test_skips_empty_slots() {
        let mut history: History<4, 16> = History::new();
        history.add("only");
        let mut out: String<16> = String::new();
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "only");
        history.previous(&mut out).unwrap();
        assert_eq!(text(&out), "");
    }

    #[test]
    fn test_clear() {
        let mut history: History<2, 8> = History::new();
        history.add("x");
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.get(0), None);
    }
}
