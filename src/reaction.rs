//! GitHub reaction vocabulary, comment scoring, and ranking.
//!
//! A comment's score is its total reaction count plus the count of positive reactions, so a
//! `+1` weighs twice as much as a `-1` or `confused` even though the total already includes
//! both. Ranking sorts by that score, highest first, and keeps fetch order among equal scores.

// std
use std::{cmp::Reverse, ops::Deref};
// self
use crate::{_prelude::*, item::Comment};

/// Glyph shown for reaction names outside the known vocabulary.
pub const UNKNOWN_EMOJI: &str = "⁉️";

/// Reactions GitHub allows on issues and comments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reaction {
	/// `+1`
	ThumbsUp,
	/// `-1`
	ThumbsDown,
	/// `laugh`
	Laugh,
	/// `confused`
	Confused,
	/// `heart`
	Heart,
	/// `hooray`
	Hooray,
	/// `rocket`
	Rocket,
	/// `eyes`
	Eyes,
}
impl Reaction {
	/// Every known reaction, in GitHub's display order.
	pub const ALL: [Reaction; 8] = [
		Reaction::ThumbsUp,
		Reaction::ThumbsDown,
		Reaction::Laugh,
		Reaction::Confused,
		Reaction::Heart,
		Reaction::Hooray,
		Reaction::Rocket,
		Reaction::Eyes,
	];
	/// Reactions counted a second time when scoring.
	pub const POSITIVE: [Reaction; 6] = [
		Reaction::ThumbsUp,
		Reaction::Laugh,
		Reaction::Hooray,
		Reaction::Heart,
		Reaction::Rocket,
		Reaction::Eyes,
	];

	/// Returns the field name GitHub uses in reaction rollups.
	pub const fn as_str(self) -> &'static str {
		match self {
			Reaction::ThumbsUp => "+1",
			Reaction::ThumbsDown => "-1",
			Reaction::Laugh => "laugh",
			Reaction::Confused => "confused",
			Reaction::Heart => "heart",
			Reaction::Hooray => "hooray",
			Reaction::Rocket => "rocket",
			Reaction::Eyes => "eyes",
		}
	}

	/// Returns the emoji glyph rendered for the reaction.
	pub const fn emoji(self) -> &'static str {
		match self {
			Reaction::ThumbsUp => "👍",
			Reaction::ThumbsDown => "👎",
			Reaction::Laugh => "😆",
			Reaction::Confused => "😕",
			Reaction::Heart => "❤️",
			Reaction::Hooray => "🎉",
			Reaction::Rocket => "🚀",
			Reaction::Eyes => "👀",
		}
	}

	/// Returns `true` for reactions in [`Reaction::POSITIVE`].
	pub const fn is_positive(self) -> bool {
		!matches!(self, Reaction::ThumbsDown | Reaction::Confused)
	}
}
impl Display for Reaction {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for Reaction {
	type Err = UnknownReaction;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Reaction::ALL
			.into_iter()
			.find(|reaction| reaction.as_str() == s)
			.ok_or_else(|| UnknownReaction(s.to_owned()))
	}
}

/// Returned when parsing a reaction name outside the known vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unknown reaction `{0}`.")]
pub struct UnknownReaction(pub String);

/// Looks up the glyph for a reaction name, falling back to [`UNKNOWN_EMOJI`].
pub fn emoji_for(name: &str) -> &'static str {
	name.parse::<Reaction>().map(Reaction::emoji).unwrap_or(UNKNOWN_EMOJI)
}

/// Reaction rollup attached to GitHub issues and comments. Missing counts decode as zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reactions {
	/// Total reactions of every kind.
	pub total_count: u64,
	/// `+1` count.
	#[serde(rename = "+1")]
	pub thumbs_up: u64,
	/// `-1` count.
	#[serde(rename = "-1")]
	pub thumbs_down: u64,
	/// `laugh` count.
	pub laugh: u64,
	/// `confused` count.
	pub confused: u64,
	/// `heart` count.
	pub heart: u64,
	/// `hooray` count.
	pub hooray: u64,
	/// `rocket` count.
	pub rocket: u64,
	/// `eyes` count.
	pub eyes: u64,
}
impl Reactions {
	/// Count for a single reaction.
	pub const fn count(&self, reaction: Reaction) -> u64 {
		match reaction {
			Reaction::ThumbsUp => self.thumbs_up,
			Reaction::ThumbsDown => self.thumbs_down,
			Reaction::Laugh => self.laugh,
			Reaction::Confused => self.confused,
			Reaction::Heart => self.heart,
			Reaction::Hooray => self.hooray,
			Reaction::Rocket => self.rocket,
			Reaction::Eyes => self.eyes,
		}
	}

	/// Sum of the counts in [`Reaction::POSITIVE`].
	pub fn positive_count(&self) -> u64 {
		Reaction::POSITIVE.iter().map(|reaction| self.count(*reaction)).sum()
	}

	/// Ranking score: `total_count + positive_count`.
	pub fn score(&self) -> u64 {
		self.total_count.saturating_add(self.positive_count())
	}
}

/// Comments ordered by score, highest first; equal scores keep their fetch order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RankedComments(Vec<Comment>);
impl RankedComments {
	/// Ranks `comments`. The output is a permutation of the input.
	pub fn rank(mut comments: Vec<Comment>) -> Self {
		// Stable: equal scores keep fetch order.
		comments.sort_by_key(|comment| Reverse(comment.score()));

		Self(comments)
	}

	/// Unwraps the ranked comments.
	pub fn into_inner(self) -> Vec<Comment> {
		self.0
	}
}
impl Deref for RankedComments {
	type Target = [Comment];

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl IntoIterator for RankedComments {
	type IntoIter = std::vec::IntoIter<Comment>;
	type Item = Comment;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use serde_json::json;
	// self
	use super::*;

	fn comment(id: u64, reactions: Value) -> Comment {
		serde_json::from_value(json!({
			"id": id,
			"body": format!("comment {id}"),
			"reactions": reactions
		}))
		.expect("Comment fixture should decode.")
	}

	fn ids(ranked: &RankedComments) -> Vec<u64> {
		ranked.iter().map(|c| c.fields().id.expect("Fixture comments carry ids.")).collect()
	}

	#[test]
	fn score_doubles_positive_sentiment() {
		let a: Reactions = serde_json::from_value(json!({ "total_count": 5, "+1": 2, "-1": 3 }))
			.expect("Reaction fixture should decode.");
		let b: Reactions = serde_json::from_value(json!({ "total_count": 5, "+1": 0, "-1": 5 }))
			.expect("Reaction fixture should decode.");

		assert_eq!(a.score(), 7);
		assert_eq!(b.score(), 5);
	}

	#[test]
	fn positive_subset_is_exactly_six_reactions() {
		let reactions = Reactions {
			total_count: 8,
			thumbs_up: 1,
			thumbs_down: 1,
			laugh: 1,
			confused: 1,
			heart: 1,
			hooray: 1,
			rocket: 1,
			eyes: 1,
		};

		assert_eq!(reactions.positive_count(), 6);
		assert_eq!(reactions.score(), 14);

		let mut positive = Reaction::POSITIVE.to_vec();

		positive.sort();

		assert_eq!(
			Reaction::ALL.into_iter().filter(|r| r.is_positive()).collect::<Vec<_>>(),
			positive
		);
	}

	#[test]
	fn rollups_ignore_unknown_fields_and_default_missing_counts() {
		let reactions: Reactions = serde_json::from_value(json!({
			"url": "https://api.github.com/repos/o/r/issues/comments/1/reactions",
			"total_count": 2,
			"heart": 2
		}))
		.expect("GitHub rollup should decode.");

		assert_eq!(reactions.heart, 2);
		assert_eq!(reactions.thumbs_up, 0);
		assert_eq!(reactions.score(), 4);
	}

	#[test]
	fn ranking_orders_by_score_and_keeps_ties_stable() {
		let ranked = RankedComments::rank(vec![
			comment(1, json!({ "total_count": 5, "+1": 0, "-1": 5 })),
			comment(2, json!({ "total_count": 1, "heart": 1 })),
			comment(3, json!({ "total_count": 5, "+1": 2, "-1": 3 })),
			comment(4, json!({ "total_count": 2, "+1": 0, "confused": 2 })),
			comment(5, json!({ "total_count": 0 })),
			comment(6, json!({ "total_count": 1, "eyes": 1 })),
		]);

		// Scores: 1 => 5, 2 => 2, 3 => 7, 4 => 2, 5 => 0, 6 => 2.
		assert_eq!(ids(&ranked), vec![3, 1, 2, 4, 6, 5]);

		let scores: Vec<u64> = ranked.iter().map(Comment::score).collect();

		assert!(scores.windows(2).all(|pair| pair[0] >= pair[1]));
	}

	#[test]
	fn ranking_is_a_permutation_for_every_tie_order() {
		let tied = [
			json!({ "total_count": 1, "+1": 1 }),
			json!({ "total_count": 2, "-1": 2 }),
			json!({ "total_count": 2, "confused": 2 }),
		];
		let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

		for order in orders {
			let input: Vec<Comment> =
				order.iter().map(|&i| comment(i as u64, tied[i].clone())).collect();
			let expected: Vec<u64> = order.iter().map(|&i| i as u64).collect();
			let ranked = RankedComments::rank(input);

			assert_eq!(ranked.len(), 3);
			assert_eq!(ids(&ranked), expected);
		}
	}

	#[test]
	fn missing_rollup_scores_zero() {
		let bare: Comment = serde_json::from_value(json!({ "id": 9, "body": "no reactions" }))
			.expect("Comment without reactions should decode.");

		assert_eq!(bare.score(), 0);
	}

	#[test]
	fn emoji_lookup_falls_back_for_unknown_names() {
		assert_eq!(emoji_for("+1"), "👍");
		assert_eq!(emoji_for("rocket"), "🚀");
		assert_eq!(emoji_for("thumbs"), UNKNOWN_EMOJI);
		assert_eq!("eyes".parse::<Reaction>(), Ok(Reaction::Eyes));
		assert!("thumbs".parse::<Reaction>().is_err());
	}
}
