//! Random population generation.
//!
//! Usernames are drawn from fixed first/last name pools in a handful of
//! familiar formats (bare first name, underscored pair, trailing
//! digits), so seeded boards look like real ones and prefix search has
//! plenty of shared prefixes to chew on.

use rand::Rng;
use uuid::Uuid;

use crate::config::RatingBounds;
use crate::engine::Leaderboard;
use crate::user::User;

const FIRST_NAMES: &[&str] = &[
    "rahul", "priya", "arjun", "sneha", "vikram", "ananya", "amit", "neha",
    "raj", "pooja", "karan", "divya", "arun", "kavita", "suresh", "meera",
    "deepak", "nisha", "sandeep", "ritu", "ajay", "swati", "vijay", "anjali",
    "rohit", "varsha", "sanjay", "payal", "manish", "komal", "nikhil", "aarti",
    "sachin", "shruti", "rakesh", "preeti", "vishal", "jyoti", "gaurav", "smita",
    "harsh", "tanvi", "mohit", "shikha", "tushar", "rashmi", "varun", "megha",
    "ashish", "pallavi", "kapil", "sonali", "kunal", "kajal", "abhishek", "tanya",
    "pankaj", "garima", "ankit", "sakshi", "vikas", "monika", "akash", "dipti",
    "naveen", "archana", "dinesh", "namrata", "sumit", "richa", "tarun", "surbhi",
];

const LAST_NAMES: &[&str] = &[
    "kumar", "sharma", "verma", "singh", "patel", "gupta", "joshi", "mehta",
    "reddy", "nair", "menon", "iyer", "rao", "pillai", "choudhary", "mishra",
    "agarwal", "banerjee", "chatterjee", "das", "mukherjee", "roy", "sen", "bose",
    "kapoor", "malhotra", "khanna", "arora", "sethi", "chopra", "bhatia", "kohli",
    "saxena", "mathur", "pandey", "tiwari", "dubey", "shukla", "tripathi", "srivastava",
    "burman", "jain", "shah", "thakur", "chauhan", "rajput", "yadav", "maurya",
];

/// Generate a random username.
pub fn generate_username(rng: &mut impl Rng) -> String {
    let first = FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())];
    let last = LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())];

    return match rng.gen_range(0..5) {
        0 => first.to_string(),
        1 => format!("{}_{}", first, last),
        2 => format!("{}{}", first, rng.gen_range(0..1000)),
        3 => format!("{}_{}{}", first, last, rng.gen_range(0..100)),
        _ => format!("{}{}", first, last),
    };
}

/// Generate a rating uniformly within bounds.
pub fn generate_rating(rng: &mut impl Rng, bounds: RatingBounds) -> i32 {
    return rng.gen_range(bounds.min..=bounds.max);
}

/// Generate a fresh random user within bounds.
pub fn generate_user(rng: &mut impl Rng, bounds: RatingBounds) -> User {
    return User::new(
        Uuid::new_v4().to_string(),
        generate_username(rng),
        generate_rating(rng, bounds),
    );
}

/// Populate the board with `count` random users. Returns how many were
/// actually added (a v4 UUID collision is astronomically unlikely, but
/// a failed insert is simply not counted rather than trusted blindly).
pub fn seed_users(board: &Leaderboard, count: usize) -> usize {
    let mut rng = rand::thread_rng();
    let bounds = board.bounds();
    let mut added = 0;
    for _ in 0..count {
        if board.add_user(generate_user(&mut rng, bounds)).is_ok() {
            added += 1;
        }
    }
    return added;
}
