//! Fork-choice and branch-diff scenarios across competing branches.

use parallax_forkdb::{ForkDatabase, ForkDbError};
use parallax_primitives::{BlockId, H256};
use parallax_types::BlockHeader;

fn header(previous: BlockId, weight: u64, salt: u64) -> BlockHeader {
    BlockHeader {
        previous,
        timestamp: 1_700_000_000 + salt,
        weight,
        transactions_root: H256::ZERO,
    }
}

#[test]
fn heavier_competing_branch_takes_head_and_branch_diff_matches() {
    let mut db = ForkDatabase::new();

    // Root -> B1 -> B2
    let root = header(BlockId::ZERO, 1, 0);
    db.push_block(root.clone()).unwrap();
    let b1 = header(root.id(), 1, 1);
    db.push_block(b1.clone()).unwrap();
    let b2 = header(b1.id(), 1, 2);
    db.push_block(b2.clone()).unwrap();
    assert_eq!(db.head().unwrap().id(), b2.id());

    // Competing Root -> B1' with higher weight than the whole B1..B2
    // suffix: head switches despite the shorter branch.
    let b1_alt = header(root.id(), 10, 3);
    let head = db.push_block(b1_alt.clone()).unwrap();
    db.check_invariants();
    assert_eq!(head.id(), b1_alt.id());

    // Branch diff for the reorg: un-apply [B2, B1], apply [B1'],
    // common ancestor Root (excluded from both).
    let (old_branch, new_branch) = db.fetch_branch_from(b2.id(), b1_alt.id()).unwrap();
    let old_ids: Vec<BlockId> = old_branch.iter().map(|m| m.id()).collect();
    let new_ids: Vec<BlockId> = new_branch.iter().map(|m| m.id()).collect();
    assert_eq!(old_ids, vec![b2.id(), b1.id()]);
    assert_eq!(new_ids, vec![b1_alt.id()]);

    // Both suffixes' last elements share the common ancestor.
    assert_eq!(old_branch.last().unwrap().previous(), root.id());
    assert_eq!(new_branch.last().unwrap().previous(), root.id());
}

#[test]
fn branch_diff_reconstructs_both_chains() {
    let mut db = ForkDatabase::new();
    let root = header(BlockId::ZERO, 1, 0);
    db.push_block(root.clone()).unwrap();

    // Build two branches of different lengths off the root.
    let mut left_tip = root.id();
    let mut left_ids = vec![];
    for i in 0..4 {
        let h = header(left_tip, 1, 10 + i);
        left_tip = h.id();
        left_ids.push(h.id());
        db.push_block(h).unwrap();
    }
    let mut right_tip = root.id();
    let mut right_ids = vec![];
    for i in 0..2 {
        let h = header(right_tip, 1, 20 + i);
        right_tip = h.id();
        right_ids.push(h.id());
        db.push_block(h).unwrap();
    }
    db.check_invariants();

    let (branch_a, branch_b) = db.fetch_branch_from(left_tip, right_tip).unwrap();

    // Most recent first; reversing either suffix walks forward from
    // the ancestor along the original chain.
    let a_ids: Vec<BlockId> = branch_a.iter().rev().map(|m| m.id()).collect();
    let b_ids: Vec<BlockId> = branch_b.iter().rev().map(|m| m.id()).collect();
    assert_eq!(a_ids, left_ids);
    assert_eq!(b_ids, right_ids);

    // Parent links are consistent through each suffix.
    for pair in branch_a.windows(2) {
        assert_eq!(pair[0].previous(), pair[1].id());
    }
    assert_eq!(branch_a.last().unwrap().previous(), root.id());
    assert_eq!(branch_b.last().unwrap().previous(), root.id());
}

#[test]
fn branch_diff_with_unknown_block_fails() {
    let mut db = ForkDatabase::new();
    let root = header(BlockId::ZERO, 1, 0);
    db.push_block(root.clone()).unwrap();

    let bogus = BlockId::stamp(H256::from_bytes([3; 32]), 9);
    let err = db.fetch_branch_from(root.id(), bogus).unwrap_err();
    assert_eq!(err, ForkDbError::UnknownBlock(bogus));
}

#[test]
fn branch_diff_across_dangling_subtree_has_no_ancestor() {
    let mut db = ForkDatabase::new();
    let root = header(BlockId::ZERO, 1, 0);
    db.push_block(root.clone()).unwrap();
    let b1 = header(root.id(), 1, 1);
    db.push_block(b1.clone()).unwrap();

    // A dangling block whose parent never arrived.
    let ghost_parent = header(b1.id(), 1, 2);
    let dangling = header(ghost_parent.id(), 1, 3);
    db.push_block(dangling.clone()).unwrap();
    db.check_invariants();

    let err = db.fetch_branch_from(dangling.id(), b1.id()).unwrap_err();
    assert!(matches!(err, ForkDbError::NoCommonAncestor { .. }));
}

#[test]
fn irreversibility_walk_keeps_indexes_agreeing() {
    let mut db = ForkDatabase::new();
    let root = header(BlockId::ZERO, 1, 0);
    db.push_block(root.clone()).unwrap();

    // Long main chain with a stale fork every few blocks.
    let mut tip = root.id();
    let mut chain = vec![];
    for i in 0..20u64 {
        let h = header(tip, 2, 100 + i);
        tip = h.id();
        chain.push(h.clone());
        db.push_block(h).unwrap();
        if i % 5 == 0 {
            // weight 1 fork off the previous tip; never wins
            let fork = header(chain[i as usize].previous, 1, 200 + i);
            db.push_block(fork).unwrap();
        }
        db.check_invariants();
    }
    assert_eq!(db.head().unwrap().id(), tip);

    // Advance irreversibility along the chain; every step prunes the
    // stale forks behind it and keeps the head stable.
    for checkpoint in [4usize, 9, 14] {
        db.set_irreversible(chain[checkpoint].id()).unwrap();
        db.check_invariants();
        assert_eq!(db.root().unwrap().id(), chain[checkpoint].id());
        assert_eq!(db.head().unwrap().id(), tip);
        // Everything below the root is gone.
        assert!(db.fetch_block_by_number(chain[checkpoint].number() - 1).is_empty());
    }
}
