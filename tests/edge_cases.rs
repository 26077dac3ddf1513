//! Boundary behavior: empty boards, clamping, tie floods, search
//! normalization, and snapshot round trips.

use podium::config::RatingBounds;
use podium::engine::Leaderboard;
use podium::error::LeaderboardError;
use podium::snapshot::Snapshot;
use podium::user::User;

// =============================================================================
// Helpers
// =============================================================================

fn board() -> Leaderboard {
    return Leaderboard::new(RatingBounds::new(100, 5000));
}

fn add(board: &Leaderboard, id: &str, name: &str, rating: i32) {
    board.add_user(User::new(id, name, rating)).unwrap();
}

// =============================================================================
// Empty board
// =============================================================================

#[test]
fn empty_board_answers_everything() {
    let board = board();

    assert_eq!(board.total_users(), 0);
    assert_eq!(board.rank_for_rating(100), 1);
    assert_eq!(board.rank_for_rating(5000), 1);
    assert_eq!(board.rank_for_rating(-42), 1);
    assert!(board.top_n(50, 0).is_empty());
    assert!(board.top_n(50, 1000).is_empty());
    assert!(board.search("anyone").is_empty());
    assert!(board.all_ids().is_empty());
    assert!(matches!(
        board.get_user("ghost"),
        Err(LeaderboardError::NotFound(_))
    ));
}

// =============================================================================
// Rating bounds
// =============================================================================

#[test]
fn both_extremes_are_achievable_and_rank_correct() {
    let board = board();
    add(&board, "low", "floor_dweller", 100);
    add(&board, "high", "ceiling_fan", 5000);

    assert_eq!(board.user_with_rank("high").unwrap().rank, 1);
    assert_eq!(board.user_with_rank("low").unwrap().rank, 2);
    assert_eq!(board.bucket_count(100), 1);
    assert_eq!(board.bucket_count(5000), 1);
}

#[test]
fn out_of_range_adds_clamp_to_the_edges() {
    let board = board();
    add(&board, "below", "undershooter", 50);
    add(&board, "above", "overshooter", 6000);

    assert_eq!(board.bucket_count(100), 1);
    assert_eq!(board.bucket_count(5000), 1);
    assert_eq!(board.get_user("below").unwrap().rating, 100);
    assert_eq!(board.get_user("above").unwrap().rating, 5000);
    assert_eq!(board.rank_for_rating(5000), 1);
    assert_eq!(board.rank_for_rating(100), 2);
}

#[test]
fn update_rejects_out_of_range_instead_of_clamping() {
    let board = board();
    add(&board, "1", "rahul", 3000);

    for bad in [99, 5001, 0, -100, i32::MAX] {
        let err = board.update_rating("1", bad).unwrap_err();
        assert!(
            matches!(err, LeaderboardError::OutOfRange { .. }),
            "rating {} should be rejected",
            bad
        );
    }
    assert_eq!(board.get_user("1").unwrap().rating, 3000);

    // The bounds themselves are fine targets.
    board.update_rating("1", 100).unwrap();
    board.update_rating("1", 5000).unwrap();
    assert_eq!(board.user_with_rank("1").unwrap().rank, 1);
}

// =============================================================================
// Ties at scale
// =============================================================================

#[test]
fn a_thousand_identical_ratings_all_rank_first() {
    let board = board();
    for i in 0..1000 {
        add(&board, &format!("u{:04}", i), &format!("player{:04}", i), 3000);
    }

    assert_eq!(board.rank_for_rating(3000), 1);
    for id in ["u0000", "u0500", "u0999"] {
        assert_eq!(board.user_with_rank(id).unwrap().rank, 1);
    }

    // Order within the tie is username ascending, so the page is just
    // the users in name order.
    let page = board.top_n(1000, 0);
    assert_eq!(page.len(), 1000);
    for pair in page.windows(2) {
        assert!(pair[0].username < pair[1].username);
    }
}

#[test]
fn identical_usernames_fall_back_to_id_order() {
    let board = board();
    add(&board, "c", "same", 3000);
    add(&board, "a", "same", 3000);
    add(&board, "b", "same", 3000);

    let ids: Vec<String> = board.top_n(10, 0).into_iter().map(|u| u.id).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

// =============================================================================
// Duplicates
// =============================================================================

#[test]
fn duplicate_id_is_rejected_cleanly() {
    let board = board();
    add(&board, "1", "original", 4000);

    let err = board
        .add_user(User::new("1", "pretender", 5000))
        .unwrap_err();
    assert_eq!(err, LeaderboardError::Duplicate("1".to_string()));

    assert_eq!(board.total_users(), 1);
    assert_eq!(board.get_user("1").unwrap().username, "original");
    assert!(board.search("pretender").is_empty());
    assert_eq!(board.bucket_count(5000), 0);
}

// =============================================================================
// Search normalization
// =============================================================================

#[test]
fn search_is_closed_under_trim_and_lowercase() {
    let board = board();
    add(&board, "1", "Rahul_Kumar", 4500);
    add(&board, "2", "rahul_verma", 4000);

    let canonical = board.search("rahul");
    assert_eq!(canonical.len(), 2);
    for variant in ["RAHUL", "  rahul", "rahul  ", " Rahul ", "\trAhUl\n"] {
        assert_eq!(board.search(variant), canonical, "variant {:?}", variant);
    }
}

#[test]
fn whitespace_only_queries_find_nothing() {
    let board = board();
    add(&board, "1", "rahul", 4500);

    for query in ["", " ", "   ", "\t", "\n \t"] {
        assert!(board.search(query).is_empty(), "query {:?}", query);
    }
}

#[test]
fn long_name_exact_lookup_hits_its_full_key() {
    let board = board();
    add(&board, "1", "rahul_kumar", 4500);

    // The full lowercased name is indexed alongside the K-prefixes, and
    // the lookup key is the query's first K characters either way.
    assert_eq!(board.search("rahul_kumar").len(), 1);
    assert_eq!(board.search("rah").len(), 1);
    assert_eq!(board.search("kumar").len(), 0); // not a prefix
}

// =============================================================================
// Snapshot round trip
// =============================================================================

#[test]
fn snapshot_clear_load_restores_population_and_ranks() {
    let mut path = std::env::temp_dir();
    path.push(format!("podium-edge-roundtrip-{}.json", std::process::id()));
    let snapshot = Snapshot::new(&path);

    let board = board();
    for i in 0..50 {
        add(
            &board,
            &format!("u{}", i),
            &format!("name{:02}", i),
            100 + (i * 97) % 4901,
        );
    }
    let ranks_before: Vec<usize> = (0..50)
        .map(|i| board.user_with_rank(&format!("u{}", i)).unwrap().rank)
        .collect();

    snapshot.save(&board).unwrap();
    board.clear();
    assert_eq!(board.total_users(), 0);
    snapshot.load(&board).unwrap();

    assert_eq!(board.total_users(), 50);
    for i in 0..50usize {
        let id = format!("u{}", i);
        let restored = board.user_with_rank(&id).unwrap();
        assert_eq!(restored.rating, 100 + (i as i32 * 97) % 4901);
        assert_eq!(restored.rank, ranks_before[i], "rank for {}", id);
    }

    snapshot.delete().unwrap();
}
