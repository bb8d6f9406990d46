//! Concurrent B+ tree over the buffer pool.
//!
//! Reads use read-latch crabbing: a parent's latch is released as soon
//! as the child's is held. Inserts use pessimistic write crabbing: the
//! descent keeps write guards from the root down, releasing ancestors
//! (and the header) the moment a child proves safe, i.e. cannot split.

use super::iterator::BPlusTreeIter;
use super::node::{node_max_size, node_size, InternalNode, LeafNode, NodeKind};
use super::types::{KeyComparator, OrdComparator, Storable};
use quarry_buffer::{BufferPoolManager, WritePageGuard};
use quarry_common::page::{PageBuf, PageId};
use quarry_common::{BTreeConfig, QuarryError, Result};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::Arc;

const ROOT_OFFSET: usize = 0;

fn read_root(data: &PageBuf) -> PageId {
    PageId(u32::from_le_bytes(
        data[ROOT_OFFSET..ROOT_OFFSET + 4]
            .try_into()
            .expect("fixed width"),
    ))
}

fn write_root(data: &mut PageBuf, root: PageId) {
    data[ROOT_OFFSET..ROOT_OFFSET + 4].copy_from_slice(&root.0.to_le_bytes());
}

/// Write-path state for one tree operation.
///
/// Owns the header guard (while the root may still move) and the chain
/// of write guards from the root toward the leaf. Single-owner and not
/// clonable, so the crabbing release is a plain pop from the front.
struct Context {
    header: Option<WritePageGuard>,
    write_set: VecDeque<WritePageGuard>,
    root_page_id: PageId,
}

impl Context {
    fn new() -> Self {
        Self {
            header: None,
            write_set: VecDeque::new(),
            root_page_id: PageId::INVALID,
        }
    }

    fn is_root(&self, page_id: PageId) -> bool {
        self.root_page_id == page_id
    }
}

/// A B+ tree storing unique keys, backed by a header page that holds the
/// root pointer.
pub struct BPlusTree<K, V, C = OrdComparator<K>>
where
    K: Storable,
    V: Storable,
    C: KeyComparator<K>,
{
    bpm: Arc<BufferPoolManager>,
    comparator: C,
    leaf_max_size: u16,
    internal_max_size: u16,
    header_page_id: PageId,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, C> BPlusTree<K, V, C>
where
    K: Storable,
    V: Storable,
    C: KeyComparator<K>,
{
    /// Creates a tree over an already-allocated header page.
    ///
    /// The header is initialized to the empty state (no root).
    pub fn new(bpm: Arc<BufferPoolManager>, comparator: C, config: BTreeConfig) -> Result<Self> {
        if config.leaf_max_size < 2 || config.leaf_max_size > LeafNode::<K, V>::capacity_limit() {
            return Err(QuarryError::NodeSizeTooLarge {
                size: config.leaf_max_size,
                max: LeafNode::<K, V>::capacity_limit(),
            });
        }
        if config.internal_max_size < 3
            || config.internal_max_size > InternalNode::<K>::capacity_limit()
        {
            return Err(QuarryError::NodeSizeTooLarge {
                size: config.internal_max_size,
                max: InternalNode::<K>::capacity_limit(),
            });
        }

        let mut header = bpm.fetch_page_write(config.header_page_id)?;
        write_root(header.data_mut(), PageId::INVALID);
        drop(header);

        Ok(Self {
            bpm,
            comparator,
            leaf_max_size: config.leaf_max_size as u16,
            internal_max_size: config.internal_max_size as u16,
            header_page_id: config.header_page_id,
            _marker: PhantomData,
        })
    }

    /// Returns the current root page id (`INVALID` for an empty tree).
    pub fn root_page_id(&self) -> Result<PageId> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        Ok(read_root(header.data()))
    }

    /// Returns true if the tree holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(!self.root_page_id()?.is_valid())
    }

    /// Point query: returns the value stored for `key`, if any.
    ///
    /// Read-latch crabbing: the header is released once the root guard is
    /// held, and each parent is released once its child's guard is held.
    pub fn get_value(&self, key: &K) -> Result<Option<V>> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = read_root(header.data());
        if !root_id.is_valid() {
            return Ok(None);
        }
        let mut guard = self.bpm.fetch_page_read(root_id)?;
        drop(header);

        while NodeKind::of(guard.data()) == Some(NodeKind::Internal) {
            let node = InternalNode::<K>::from_bytes(guard.data());
            let index = node.lookup(key, &self.comparator);
            let child_id = node.value_at(index);
            let child = self.bpm.fetch_page_read(child_id)?;
            // Assignment drops the parent guard after the child is held.
            guard = child;
        }

        let leaf = LeafNode::<K, V>::from_bytes(guard.data());
        let (index, equal) = leaf.lookup(key, &self.comparator);
        Ok(if equal { Some(leaf.value_at(index)) } else { None })
    }

    /// Inserts a unique key. Returns false if the key already exists.
    pub fn insert(&self, key: &K, value: &V) -> Result<bool> {
        let mut ctx = Context::new();
        // A node is safe for insert when one more entry cannot fill it.
        let safe = |data: &PageBuf| node_size(data) + 1 < node_max_size(data);
        let leaf_page_id = self.find_leaf_to_modify(key, &mut ctx, &safe)?;

        let mut leaf_guard = ctx
            .write_set
            .pop_back()
            .ok_or_else(|| QuarryError::BTreeCorrupted("descent held no leaf guard".to_string()))?;
        let mut leaf = LeafNode::<K, V>::from_bytes(leaf_guard.data());
        let (index, equal) = leaf.lookup(key, &self.comparator);
        if equal {
            return Ok(false);
        }

        leaf.insert_at(index, *key, *value);
        if leaf.size() < leaf.max_size() {
            leaf.write_to(leaf_guard.data_mut());
            return Ok(true);
        }

        // Leaf is full: split, thread the chain, push the separator up.
        let mut new_guard = self.bpm.new_page()?.upgrade_write();
        let new_page_id = new_guard.page_id();
        let mut new_leaf = LeafNode::<K, V>::new(self.leaf_max_size);
        leaf.move_right_half_to(&mut new_leaf);
        new_leaf.set_next_page_id(leaf.next_page_id());
        leaf.set_next_page_id(new_page_id);

        leaf.write_to(leaf_guard.data_mut());
        new_leaf.write_to(new_guard.data_mut());
        log::debug!("split leaf {} into {}", leaf_page_id, new_page_id);

        let separator = new_leaf.key_at(0);
        self.insert_to_parent(leaf_page_id, new_page_id, separator, &mut ctx)?;
        Ok(true)
    }

    /// Deletes a key.
    ///
    /// Currently a no-op: the index is append-only and rebalancing
    /// deletion is not implemented. Callers treat heap tombstones as the
    /// source of truth for row visibility.
    pub fn remove(&self, _key: &K) -> Result<()> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = read_root(header.data());
        if !root_id.is_valid() {
            return Ok(());
        }
        Ok(())
    }

    /// Returns an iterator positioned at the leftmost key.
    pub fn iter(&self) -> Result<BPlusTreeIter<K, V>> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = read_root(header.data());
        if !root_id.is_valid() {
            return Ok(BPlusTreeIter::end(Arc::clone(&self.bpm)));
        }
        let mut guard = self.bpm.fetch_page_read(root_id)?;
        drop(header);

        while NodeKind::of(guard.data()) == Some(NodeKind::Internal) {
            let node = InternalNode::<K>::from_bytes(guard.data());
            let child = self.bpm.fetch_page_read(node.value_at(0))?;
            guard = child;
        }
        Ok(BPlusTreeIter::at(Arc::clone(&self.bpm), guard, 0))
    }

    /// Returns an iterator positioned at the first key >= `key`.
    pub fn iter_from(&self, key: &K) -> Result<BPlusTreeIter<K, V>> {
        let header = self.bpm.fetch_page_read(self.header_page_id)?;
        let root_id = read_root(header.data());
        if !root_id.is_valid() {
            return Ok(BPlusTreeIter::end(Arc::clone(&self.bpm)));
        }
        let mut guard = self.bpm.fetch_page_read(root_id)?;
        drop(header);

        while NodeKind::of(guard.data()) == Some(NodeKind::Internal) {
            let node = InternalNode::<K>::from_bytes(guard.data());
            let index = node.lookup(key, &self.comparator);
            let child = self.bpm.fetch_page_read(node.value_at(index))?;
            guard = child;
        }

        let leaf = LeafNode::<K, V>::from_bytes(guard.data());
        let (index, _) = leaf.lookup(key, &self.comparator);
        Ok(BPlusTreeIter::at(Arc::clone(&self.bpm), guard, index))
    }

    /// Descends to the leaf that owns `key`, collecting write guards.
    ///
    /// The context leaves the function holding the tail of the path:
    /// every guard from the deepest unsafe ancestor down to the leaf,
    /// plus the header guard if no ancestor was safe. An empty tree
    /// grows a root leaf here.
    fn find_leaf_to_modify(
        &self,
        key: &K,
        ctx: &mut Context,
        safe: &dyn Fn(&PageBuf) -> bool,
    ) -> Result<PageId> {
        let header_guard = self.bpm.fetch_page_write(self.header_page_id)?;
        ctx.root_page_id = read_root(header_guard.data());
        ctx.header = Some(header_guard);

        if !ctx.root_page_id.is_valid() {
            let mut root_guard = self.bpm.new_page()?.upgrade_write();
            let root_page_id = root_guard.page_id();
            LeafNode::<K, V>::init_page(root_guard.data_mut(), self.leaf_max_size);
            self.set_root(root_page_id, ctx)?;
            log::debug!("tree bootstrapped with root leaf {}", root_page_id);
            ctx.write_set.push_back(root_guard);
            return Ok(root_page_id);
        }

        let mut current_id = ctx.root_page_id;
        let current = self.bpm.fetch_page_write(current_id)?;
        ctx.write_set.push_back(current);

        loop {
            let back = ctx.write_set.back().expect("descent path is non-empty");
            if NodeKind::of(back.data()) != Some(NodeKind::Internal) {
                break;
            }
            let node = InternalNode::<K>::from_bytes(back.data());
            let index = node.lookup(key, &self.comparator);
            current_id = node.value_at(index);

            let child = self.bpm.fetch_page_write(current_id)?;
            ctx.write_set.push_back(child);

            // Crabbing release: a safe child frees the header and every
            // ancestor above it.
            let child_ref = ctx.write_set.back().expect("just pushed");
            if safe(child_ref.data()) {
                ctx.header = None;
                while ctx.write_set.len() > 1 {
                    ctx.write_set.pop_front();
                }
            }
        }
        Ok(current_id)
    }

    /// Propagates a split upward: links `right_page_id` (with separator
    /// `key`) next to `left_page_id` in its parent, splitting parents as
    /// needed and growing a new root at the top.
    fn insert_to_parent(
        &self,
        left_page_id: PageId,
        right_page_id: PageId,
        key: K,
        ctx: &mut Context,
    ) -> Result<()> {
        if ctx.is_root(left_page_id) {
            let mut root_guard = self.bpm.new_page()?.upgrade_write();
            let root_page_id = root_guard.page_id();
            let mut root = InternalNode::<K>::new(self.internal_max_size);
            root.insert_first_value(left_page_id);
            root.insert(key, right_page_id, &self.comparator);
            root.write_to(root_guard.data_mut());
            self.set_root(root_page_id, ctx)?;
            log::debug!("new root {} over {} and {}", root_page_id, left_page_id, right_page_id);
            return Ok(());
        }

        let mut parent_guard = ctx.write_set.pop_back().ok_or_else(|| {
            QuarryError::BTreeCorrupted("split propagation lost its parent guard".to_string())
        })?;
        let parent_page_id = parent_guard.page_id();
        let mut parent = InternalNode::<K>::from_bytes(parent_guard.data());

        if parent.size() < parent.max_size() {
            parent.insert(key, right_page_id, &self.comparator);
            parent.write_to(parent_guard.data_mut());
            return Ok(());
        }

        // Parent is full. Split it so the right node ends with equal or
        // one more entry than the left, then hoist the right node's
        // slot-0 key as the separator.
        let insert_pos = parent.lookup(&key, &self.comparator) + 1;
        let size = parent.size();
        let mid = size / 2;

        let mut new_guard = self.bpm.new_page()?.upgrade_write();
        let new_page_id = new_guard.page_id();
        let mut new_parent = InternalNode::<K>::new(self.internal_max_size);
        parent.move_right_half_to(&mut new_parent);

        if insert_pos >= mid {
            if size % 2 == 0 {
                new_parent.insert_at(insert_pos - mid, key, right_page_id);
            } else if insert_pos == mid {
                parent.insert_at(insert_pos, key, right_page_id);
            } else {
                new_parent.move_first_to_last_of(&mut parent);
                new_parent.insert_at(insert_pos - mid - 1, key, right_page_id);
            }
        } else {
            parent.insert_at(insert_pos, key, right_page_id);
            if size % 2 == 0 {
                parent.move_last_to_first_of(&mut new_parent);
            }
        }

        let separator = new_parent.key_at(0);
        new_parent.set_key_at(0, K::default());
        parent.write_to(parent_guard.data_mut());
        new_parent.write_to(new_guard.data_mut());
        log::debug!("split internal {} into {}", parent_page_id, new_page_id);

        self.insert_to_parent(parent_page_id, new_page_id, separator, ctx)
    }

    /// Rewrites the root pointer through the header guard in the context.
    fn set_root(&self, root_page_id: PageId, ctx: &mut Context) -> Result<()> {
        let header = ctx.header.as_mut().ok_or_else(|| {
            QuarryError::BTreeCorrupted("root change without the header latched".to_string())
        })?;
        write_root(header.data_mut(), root_page_id);
        ctx.root_page_id = root_page_id;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_buffer::MemoryDiskManager;
    use quarry_common::BufferPoolConfig;

    type TestTree = BPlusTree<i64, u64>;

    fn test_tree(leaf_max: usize, internal_max: usize) -> (TestTree, Arc<BufferPoolManager>) {
        let bpm = Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 64,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ));
        let header = bpm.new_page().unwrap();
        let header_page_id = header.page_id();
        drop(header);
        let tree = BPlusTree::new(
            Arc::clone(&bpm),
            OrdComparator::default(),
            BTreeConfig::new(leaf_max, internal_max, header_page_id),
        )
        .unwrap();
        (tree, bpm)
    }

    #[test]
    fn test_empty_tree() {
        let (tree, _bpm) = test_tree(3, 3);
        assert!(tree.is_empty().unwrap());
        assert_eq!(tree.get_value(&1).unwrap(), None);
        assert_eq!(tree.root_page_id().unwrap(), PageId::INVALID);
    }

    #[test]
    fn test_first_insert_creates_root_leaf() {
        let (tree, _bpm) = test_tree(3, 3);

        assert!(tree.insert(&1, &100).unwrap());
        assert!(!tree.is_empty().unwrap());
        assert_eq!(tree.get_value(&1).unwrap(), Some(100));
    }

    #[test]
    fn test_duplicate_insert_rejected() {
        let (tree, _bpm) = test_tree(3, 3);

        assert!(tree.insert(&1, &100).unwrap());
        assert!(!tree.insert(&1, &200).unwrap());
        // The failed insert did not alter the stored value.
        assert_eq!(tree.get_value(&1).unwrap(), Some(100));
    }

    #[test]
    fn test_split_cascade_small_fanout() {
        // leaf_max = internal_max = 3.
        let (tree, bpm) = test_tree(3, 3);

        // Insert 1,2,3: the root leaf fills on 3 and splits into
        // L1=[1] and L2=[2,3] under a new internal root keyed [_, 2].
        for key in [1i64, 2, 3] {
            assert!(tree.insert(&key, &(key as u64)).unwrap());
        }
        let root_id = tree.root_page_id().unwrap();
        {
            let root_guard = bpm.fetch_page_read(root_id).unwrap();
            assert_eq!(NodeKind::of(root_guard.data()), Some(NodeKind::Internal));
            let root = InternalNode::<i64>::from_bytes(root_guard.data());
            assert_eq!(root.size(), 2);
            assert_eq!(root.key_at(1), 2);

            let left = bpm.fetch_page_read(root.value_at(0)).unwrap();
            let l1 = LeafNode::<i64, u64>::from_bytes(left.data());
            assert_eq!(l1.size(), 1);
            assert_eq!(l1.key_at(0), 1);

            let right = bpm.fetch_page_read(root.value_at(1)).unwrap();
            let l2 = LeafNode::<i64, u64>::from_bytes(right.data());
            assert_eq!(l2.size(), 2);
            assert_eq!(l2.key_at(0), 2);
            assert_eq!(l2.key_at(1), 3);
        }

        // Insert 4: [2,3,4] splits into [2] | [3,4], hoisting 3. The
        // root now separates three children with keys [_, 2, 3].
        assert!(tree.insert(&4, &4).unwrap());
        {
            let root_guard = bpm.fetch_page_read(tree.root_page_id().unwrap()).unwrap();
            let root = InternalNode::<i64>::from_bytes(root_guard.data());
            assert_eq!(root.size(), 3);
            assert_eq!(root.key_at(1), 2);
            assert_eq!(root.key_at(2), 3);
        }

        // Insert 5: [3,4,5] splits and the separator 4 overflows the
        // full root, so the root itself splits under a new root with a
        // single separator; both children are internal pages.
        let old_root_id = tree.root_page_id().unwrap();
        assert!(tree.insert(&5, &5).unwrap());
        let new_root_id = tree.root_page_id().unwrap();
        assert_ne!(new_root_id, old_root_id);
        {
            let root_guard = bpm.fetch_page_read(new_root_id).unwrap();
            let root = InternalNode::<i64>::from_bytes(root_guard.data());
            assert_eq!(root.size(), 2);
            assert_eq!(root.key_at(1), 3);

            for slot in 0..2 {
                let child = bpm.fetch_page_read(root.value_at(slot)).unwrap();
                assert_eq!(NodeKind::of(child.data()), Some(NodeKind::Internal));
            }
        }

        // Insert 0: lands in the leftmost leaf [1] without splitting;
        // the root is untouched.
        assert!(tree.insert(&0, &0).unwrap());
        assert_eq!(tree.root_page_id().unwrap(), new_root_id);

        // All keys remain reachable.
        for key in [0i64, 1, 2, 3, 4, 5] {
            assert_eq!(tree.get_value(&key).unwrap(), Some(key as u64), "key {}", key);
        }
    }

    #[test]
    fn test_sequential_inserts_and_lookups() {
        let (tree, _bpm) = test_tree(4, 4);

        for key in 0i64..200 {
            assert!(tree.insert(&key, &((key * 10) as u64)).unwrap());
        }
        for key in 0i64..200 {
            assert_eq!(tree.get_value(&key).unwrap(), Some((key * 10) as u64));
        }
        assert_eq!(tree.get_value(&200).unwrap(), None);
        assert_eq!(tree.get_value(&-1).unwrap(), None);
    }

    #[test]
    fn test_reverse_and_interleaved_inserts() {
        let (tree, _bpm) = test_tree(3, 3);

        let keys: Vec<i64> = (0..100).rev().collect();
        for &key in &keys {
            assert!(tree.insert(&key, &(key as u64)).unwrap());
        }
        for &key in &keys {
            assert_eq!(tree.get_value(&key).unwrap(), Some(key as u64));
        }
    }

    #[test]
    fn test_leaf_chain_stays_sorted() {
        let (tree, _bpm) = test_tree(3, 3);

        let keys = [13i64, 7, 42, 1, 99, 23, 8, 55, 2, 71];
        for &key in &keys {
            tree.insert(&key, &(key as u64)).unwrap();
        }

        let mut iter = tree.iter().unwrap();
        let mut seen = Vec::new();
        while let Some((key, value)) = iter.next().unwrap() {
            assert_eq!(value, key as u64);
            seen.push(key);
        }
        let mut expected: Vec<i64> = keys.to_vec();
        expected.sort_unstable();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_iter_from_mid_key() {
        let (tree, _bpm) = test_tree(3, 3);

        for key in (0i64..50).map(|k| k * 2) {
            tree.insert(&key, &(key as u64)).unwrap();
        }

        // 31 is absent; iteration starts at 32.
        let mut iter = tree.iter_from(&31).unwrap();
        let mut seen = Vec::new();
        while let Some((key, _)) = iter.next().unwrap() {
            seen.push(key);
        }
        let expected: Vec<i64> = (16..50).map(|k| k * 2).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_iter_from_past_end() {
        let (tree, _bpm) = test_tree(3, 3);
        tree.insert(&1, &1).unwrap();

        let mut iter = tree.iter_from(&100).unwrap();
        assert!(iter.next().unwrap().is_none());
        assert!(iter.is_end());
    }

    #[test]
    fn test_remove_is_append_only_noop() {
        let (tree, _bpm) = test_tree(3, 3);
        tree.remove(&1).unwrap();

        tree.insert(&1, &10).unwrap();
        tree.remove(&1).unwrap();
        assert_eq!(tree.get_value(&1).unwrap(), Some(10));
    }

    #[test]
    fn test_random_workload() {
        use rand::seq::SliceRandom;

        let (tree, _bpm) = test_tree(5, 5);
        let mut keys: Vec<i64> = (0..500).collect();
        keys.shuffle(&mut rand::thread_rng());

        for &key in &keys {
            assert!(tree.insert(&key, &(key as u64 + 1)).unwrap());
        }
        for key in 0i64..500 {
            assert_eq!(tree.get_value(&key).unwrap(), Some(key as u64 + 1));
        }

        // Iterator sees every key exactly once, ascending.
        let mut iter = tree.iter().unwrap();
        let mut count = 0i64;
        while let Some((key, _)) = iter.next().unwrap() {
            assert_eq!(key, count);
            count += 1;
        }
        assert_eq!(count, 500);
    }

    #[test]
    fn test_concurrent_inserts() {
        use std::thread;

        let bpm = Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 256,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ));
        let header = bpm.new_page().unwrap();
        let header_page_id = header.page_id();
        drop(header);
        let tree = Arc::new(
            BPlusTree::<i64, u64>::new(
                Arc::clone(&bpm),
                OrdComparator::default(),
                BTreeConfig::new(8, 8, header_page_id),
            )
            .unwrap(),
        );

        let mut handles = Vec::new();
        for t in 0i64..4 {
            let tree = Arc::clone(&tree);
            handles.push(thread::spawn(move || {
                for i in 0..250 {
                    let key = t * 250 + i;
                    assert!(tree.insert(&key, &(key as u64)).unwrap());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        for key in 0i64..1000 {
            assert_eq!(tree.get_value(&key).unwrap(), Some(key as u64), "key {}", key);
        }

        let mut iter = tree.iter().unwrap();
        let mut previous = i64::MIN;
        let mut count = 0;
        while let Some((key, _)) = iter.next().unwrap() {
            assert!(key > previous);
            previous = key;
            count += 1;
        }
        assert_eq!(count, 1000);
    }

    #[test]
    fn test_invalid_fanout_rejected() {
        let bpm = Arc::new(BufferPoolManager::new(
            BufferPoolConfig {
                pool_size: 8,
                replacer_k: 2,
            },
            Arc::new(MemoryDiskManager::new()),
        ));
        let header = bpm.new_page().unwrap();
        let header_page_id = header.page_id();
        drop(header);

        let result = BPlusTree::<i64, u64>::new(
            Arc::clone(&bpm),
            OrdComparator::default(),
            BTreeConfig::new(1, 3, header_page_id),
        );
        assert!(matches!(result, Err(QuarryError::NodeSizeTooLarge { .. })));

        let result = BPlusTree::<i64, u64>::new(
            bpm,
            OrdComparator::default(),
            BTreeConfig::new(4, 100_000, header_page_id),
        );
        assert!(matches!(result, Err(QuarryError::NodeSizeTooLarge { .. })));
    }
}
