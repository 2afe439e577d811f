use std::cmp::Ordering;
use std::collections::HashMap;

use crate::models::progress::{LeaderboardEntry, UserStats};
use crate::models::UserProfile;

const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct RankedUser {
    pub rank: u32,
    pub user_id: String,
    pub stats: UserStats,
}

/// Orders by total xp descending, then user id ascending, and truncates to `limit`.
///
/// Ranks are dense over xp: equal xp share a rank and the next distinct xp
/// continues at rank + 1.
pub fn rank(mut candidates: Vec<(String, UserStats)>, limit: usize) -> Vec<RankedUser> {
    candidates.sort_by(|(a_id, a), (b_id, b)| compare(a_id, a, b_id, b));

    let mut ranked = Vec::with_capacity(limit.min(candidates.len()));
    let mut rank = 0u32;
    let mut previous_xp: Option<u64> = None;

    for (user_id, stats) in candidates.into_iter().take(limit) {
        if previous_xp != Some(stats.total_xp) {
            rank += 1;
            previous_xp = Some(stats.total_xp);
        }
        ranked.push(RankedUser {
            rank,
            user_id,
            stats,
        });
    }

    ranked
}

fn compare(a_id: &str, a: &UserStats, b_id: &str, b: &UserStats) -> Ordering {
    b.total_xp
        .cmp(&a.total_xp)
        .then_with(|| a_id.cmp(b_id))
}

/// Attaches display names; users without a profile are shown as "Unknown".
pub fn with_profiles(
    ranked: Vec<RankedUser>,
    profiles: &HashMap<String, UserProfile>,
) -> Vec<LeaderboardEntry> {
    ranked
        .into_iter()
        .map(|row| {
            let display_name = profiles
                .get(&row.user_id)
                .map(|profile| sanitize_display_name(&profile.display_name))
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string());
            LeaderboardEntry {
                rank: row.rank,
                user_id: row.user_id,
                display_name,
                stats: row.stats,
            }
        })
        .collect()
}

/// Keeps alphanumerics, whitespace and `-_.`, capped at 100 characters.
fn sanitize_display_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || "-_.".contains(*c))
        .take(100)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, xp: u64) -> (String, UserStats) {
        (
            id.to_string(),
            UserStats {
                total_xp: xp,
                ..UserStats::default()
            },
        )
    }

    fn ids(ranked: &[RankedUser]) -> Vec<&str> {
        ranked.iter().map(|r| r.user_id.as_str()).collect()
    }

    #[test]
    fn orders_by_xp_descending() {
        let ranked = rank(
            vec![user("a", 10), user("b", 300), user("c", 120)],
            10,
        );
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn ties_break_on_user_id_regardless_of_input_order() {
        let forward = rank(vec![user("zoe", 50), user("amy", 50), user("max", 80)], 10);
        let backward = rank(vec![user("max", 80), user("amy", 50), user("zoe", 50)], 10);

        assert_eq!(ids(&forward), vec!["max", "amy", "zoe"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn equal_xp_shares_a_dense_rank() {
        let ranked = rank(
            vec![user("a", 90), user("b", 90), user("c", 40), user("d", 10)],
            10,
        );
        assert_eq!(
            ranked.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 1, 2, 3]
        );
    }

    #[test]
    fn truncates_after_full_ordering() {
        let candidates: Vec<_> = (0..50).map(|i| user(&format!("u{:02}", i), i)).collect();
        let ranked = rank(candidates, 3);
        assert_eq!(ids(&ranked), vec!["u49", "u48", "u47"]);
    }

    #[test]
    fn repeated_ranking_is_stable() {
        let candidates = vec![user("a", 5), user("b", 7), user("c", 5), user("d", 0)];
        let first = rank(candidates.clone(), 4);
        for _ in 0..10 {
            assert_eq!(rank(candidates.clone(), 4), first);
        }
    }

    #[test]
    fn empty_input_yields_empty_board() {
        assert!(rank(Vec::new(), 10).is_empty());
    }

    #[test]
    fn profiles_are_attached_and_sanitized() {
        let ranked = rank(vec![user("a", 20), user("b", 10), user("c", 5)], 10);
        let mut profiles = HashMap::new();
        profiles.insert(
            "a".to_string(),
            UserProfile {
                user_id: "a".to_string(),
                display_name: "=Søren <b>".to_string(),
            },
        );
        profiles.insert(
            "c".to_string(),
            UserProfile {
                user_id: "c".to_string(),
                display_name: "@@@".to_string(),
            },
        );

        let entries = with_profiles(ranked, &profiles);
        assert_eq!(entries[0].display_name, "Søren b");
        assert_eq!(entries[1].display_name, "Unknown");
        assert_eq!(entries[2].display_name, "Unknown");
    }

    #[test]
    fn sanitize_limits_length() {
        assert_eq!(sanitize_display_name(&"å".repeat(150)).chars().count(), 100);
        assert_eq!(sanitize_display_name("Anne-Mette"), "Anne-Mette");
    }
}
