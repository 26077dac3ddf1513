//! Ordered live-user sequence backed by an arena skip list.
//!
//! Users are kept in board order (rating descending, username
//! ascending, id ascending) so a leaderboard page is a forward walk.
//! An id→node map gives O(1) node lookup, which makes removal exact
//! even under heavy rating ties: we unlink the one node recorded for
//! the id, never "the first node that compares equal".
//!
//! # Structure
//!
//! Nodes live in an arena (`Vec<Node>`) addressed by `u32` indices,
//! with a free list for reusing removed slots. Each node stores one
//! user and a fixed-size forward-pointer array; the head node is a
//! sentinel with no user and full height.
//!
//! ```text
//! Level 2: HEAD ----------------> carol(4200) ------------> NULL
//! Level 1: HEAD -> erin(4800) --> carol(4200) ------------> NULL
//! Level 0: HEAD -> erin(4800) --> carol(4200) -> ali(3100) -> NULL
//! ```
//!
//! # Operations
//!
//! - `insert(user)`: O(log n) expected; duplicate id is a silent no-op
//! - `remove(id)`: O(log n) expected; false if the id is absent
//! - `slice(limit, offset)`: O(offset + limit) forward walk
//! - `len` / `contains`: O(1)
//!
//! Node heights come from a per-list xorshift generator, promoting with
//! probability 1/4 per level up to 16 levels. The generator is owned by
//! the list and only advanced while the caller holds its write access,
//! so no synchronization is needed and the level distribution is not
//! skewed by races.

use std::cmp::Ordering;
use std::mem::MaybeUninit;

use rustc_hash::FxHashMap;

use crate::user::board_order;
use crate::user::User;

/// Maximum skip list height. 16 levels covers millions of users.
const MAX_HEIGHT: usize = 16;

/// Node index type. u32 halves pointer overhead vs usize on 64-bit.
type Idx = u32;

/// Null index marker.
const NULL: Idx = Idx::MAX;

/// A node in the ranked list. One user per node.
struct Node {
    /// The user stored in this node. Uninitialized for the head
    /// sentinel and for slots parked on the free list.
    user: MaybeUninit<User>,
    /// Height of this node (number of levels it participates in).
    height: u8,
    /// Forward pointers at each level; NULL above `height`.
    next: [Idx; MAX_HEIGHT],
}

impl Node {
    fn new(height: u8, user: User) -> Node {
        return Node {
            user: MaybeUninit::new(user),
            height,
            next: [NULL; MAX_HEIGHT],
        };
    }

    fn new_head() -> Node {
        return Node {
            user: MaybeUninit::uninit(),
            height: MAX_HEIGHT as u8,
            next: [NULL; MAX_HEIGHT],
        };
    }

    fn height(&self) -> usize {
        return self.height as usize;
    }
}

/// Skip list of users in board order with O(1) id lookup.
pub struct RankedList {
    /// Arena of nodes. Index 0 is the head sentinel.
    nodes: Vec<Node>,
    head: Idx,
    /// Number of users (not counting the head).
    len: usize,
    /// Slots of removed nodes available for reuse.
    free_list: Vec<Idx>,
    /// id -> node index, for exact removal.
    by_id: FxHashMap<String, Idx>,
    /// Xorshift state for height generation.
    rand_state: u64,
}

impl RankedList {
    pub fn new() -> RankedList {
        let mut list = RankedList {
            nodes: Vec::new(),
            head: 0,
            len: 0,
            free_list: Vec::new(),
            by_id: FxHashMap::default(),
            // Any nonzero seed works: xorshift64 permutes the nonzero
            // u64s, so the state can never collapse to zero.
            rand_state: rand::random::<u64>() | 1,
        };
        list.nodes.push(Node::new_head());
        return list;
    }

    pub fn len(&self) -> usize {
        return self.len;
    }

    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// Whether a user with this id is present.
    pub fn contains(&self, id: &str) -> bool {
        return self.by_id.contains_key(id);
    }

    // --- Node access helpers ---

    fn node(&self, idx: Idx) -> &Node {
        return &self.nodes[idx as usize];
    }

    fn node_mut(&mut self, idx: Idx) -> &mut Node {
        return &mut self.nodes[idx as usize];
    }

    /// The user stored at a non-head, non-free node.
    fn user_at(&self, idx: Idx) -> &User {
        debug_assert!(idx != self.head);
        return unsafe { self.node(idx).user.assume_init_ref() };
    }

    fn alloc_node(&mut self, height: u8, user: User) -> Idx {
        if let Some(idx) = self.free_list.pop() {
            let node = self.node_mut(idx);
            node.user = MaybeUninit::new(user);
            node.height = height;
            node.next = [NULL; MAX_HEIGHT];
            return idx;
        }
        let idx = self.nodes.len() as Idx;
        self.nodes.push(Node::new(height, user));
        return idx;
    }

    /// Generate a node height: promote with probability 1/4 per level.
    fn random_height(&mut self) -> u8 {
        self.rand_state ^= self.rand_state << 13;
        self.rand_state ^= self.rand_state >> 7;
        self.rand_state ^= self.rand_state << 17;
        let zeros = self.rand_state.trailing_zeros() as u8;
        return (zeros / 2 + 1).min(MAX_HEIGHT as u8);
    }

    // --- Invariant checking ---

    #[cfg(debug_assertions)]
    fn check_invariants(&self) {
        let mut count = 0;
        let mut idx = self.node(self.head).next[0];
        let mut prev: Option<Idx> = None;
        while idx != NULL {
            if let Some(p) = prev {
                assert_eq!(
                    board_order(self.user_at(p), self.user_at(idx)),
                    Ordering::Less,
                    "INVARIANT VIOLATED: chain out of board order"
                );
            }
            assert_eq!(
                self.by_id.get(&self.user_at(idx).id),
                Some(&idx),
                "INVARIANT VIOLATED: id map does not point at its node"
            );
            prev = Some(idx);
            count += 1;
            idx = self.node(idx).next[0];
        }
        assert_eq!(count, self.len, "INVARIANT VIOLATED: chain length != len");
        assert_eq!(self.by_id.len(), self.len, "INVARIANT VIOLATED: id map size != len");
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn check_invariants(&self) {}

    // --- Core operations ---

    /// Find the predecessor of `user`'s position at every level.
    /// `update[l].next[l]` is the first node not before `user` at level `l`.
    fn find_update_path(&self, user: &User) -> [Idx; MAX_HEIGHT] {
        let mut update = [self.head; MAX_HEIGHT];
        let mut idx = self.head;
        for level in (0..MAX_HEIGHT).rev() {
            loop {
                let next = self.node(idx).next[level];
                if next == NULL {
                    break;
                }
                if board_order(self.user_at(next), user) == Ordering::Less {
                    idx = next;
                } else {
                    break;
                }
            }
            update[level] = idx;
        }
        return update;
    }

    /// Insert a user at its board position. O(log n) expected.
    /// Inserting an id that is already present is a silent no-op; the
    /// coordinator rejects duplicates before they reach this point.
    pub fn insert(&mut self, user: User) {
        if self.by_id.contains_key(&user.id) {
            return;
        }

        let update = self.find_update_path(&user);
        let height = self.random_height();
        let id = user.id.clone();
        let new_idx = self.alloc_node(height, user);

        for level in 0..height as usize {
            let pred = update[level];
            let old_next = self.node(pred).next[level];
            self.node_mut(new_idx).next[level] = old_next;
            self.node_mut(pred).next[level] = new_idx;
        }

        self.by_id.insert(id, new_idx);
        self.len += 1;
        self.check_invariants();
    }

    /// Remove the node recorded for `id`. O(log n) expected.
    /// Returns false if the id is absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(&target) = self.by_id.get(id) else {
            return false;
        };

        // The board order is strict and total (id is the final
        // tiebreak), so the predecessor search lands exactly on the
        // target node at every level it participates in.
        let update = {
            let user = unsafe { self.node(target).user.assume_init_ref() };
            self.find_update_path(user)
        };

        let target_height = self.node(target).height();
        for level in 0..target_height {
            let pred = update[level];
            if self.node(pred).next[level] == target {
                let after = self.node(target).next[level];
                self.node_mut(pred).next[level] = after;
            }
        }

        // Move the user out so its strings drop now; the slot itself
        // is parked for reuse.
        let user = unsafe { self.node_mut(target).user.assume_init_read() };
        self.by_id.remove(&user.id);
        self.free_list.push(target);
        self.len -= 1;
        self.check_invariants();
        return true;
    }

    /// Copy up to `limit` users starting at the `offset`-th position in
    /// board order. An out-of-range offset yields an empty vec.
    /// O(offset + limit).
    pub fn slice(&self, limit: usize, offset: usize) -> Vec<User> {
        if offset >= self.len {
            return Vec::new();
        }

        let mut idx = self.node(self.head).next[0];
        for _ in 0..offset {
            if idx == NULL {
                return Vec::new();
            }
            idx = self.node(idx).next[0];
        }

        let mut out = Vec::with_capacity(limit.min(self.len - offset));
        while idx != NULL && out.len() < limit {
            out.push(self.user_at(idx).clone());
            idx = self.node(idx).next[0];
        }
        return out;
    }

    /// Iterate users in board order.
    pub fn iter(&self) -> impl Iterator<Item = &User> {
        return RankedListIter {
            list: self,
            current: self.node(self.head).next[0],
        };
    }

    /// All live user ids, in no particular order.
    pub fn all_ids(&self) -> Vec<String> {
        return self.by_id.keys().cloned().collect();
    }

    /// Drop every user and reset to empty.
    pub fn clear(&mut self) {
        let mut idx = self.node(self.head).next[0];
        while idx != NULL {
            let next = self.node(idx).next[0];
            unsafe { self.node_mut(idx).user.assume_init_drop() };
            idx = next;
        }
        self.nodes.truncate(1);
        self.nodes[0].next = [NULL; MAX_HEIGHT];
        self.free_list.clear();
        self.by_id.clear();
        self.len = 0;
    }
}

impl Default for RankedList {
    fn default() -> RankedList {
        return RankedList::new();
    }
}

impl Drop for RankedList {
    fn drop(&mut self) {
        let mut idx = self.node(self.head).next[0];
        while idx != NULL {
            let next = self.node(idx).next[0];
            unsafe { self.node_mut(idx).user.assume_init_drop() };
            idx = next;
        }
    }
}

struct RankedListIter<'a> {
    list: &'a RankedList,
    current: Idx,
}

impl<'a> Iterator for RankedListIter<'a> {
    type Item = &'a User;

    fn next(&mut self) -> Option<&'a User> {
        if self.current == NULL {
            return None;
        }
        let user = self.list.user_at(self.current);
        self.current = self.list.node(self.current).next[0];
        return Some(user);
    }
}
