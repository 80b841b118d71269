//! Typed views over opaque provider records.
//!
//! Upstream objects are kept exactly as received; only the handful of fields the ranking and
//! dispatch logic consume are decoded next to them. Serializing an item yields the original JSON.

// std
use std::marker::PhantomData;
// crates.io
use serde::{
	Deserializer, Serializer,
	de::{Error as DeError, MapAccess, Visitor},
};
// self
use crate::{_prelude::*, reaction::Reactions};

/// An upstream record paired with a typed view of the fields the crate reads.
#[derive(Clone, Debug)]
pub struct ProviderItem<F> {
	fields: F,
	raw: Value,
}
impl<F> ProviderItem<F>
where
	F: DeserializeOwned,
{
	/// Decodes the typed view from `raw`, keeping `raw` untouched.
	pub fn from_value(raw: Value) -> Result<Self, serde_json::Error> {
		let fields = F::deserialize(&raw)?;

		Ok(Self { fields, raw })
	}
}
impl<F> ProviderItem<F> {
	/// Typed view of the consumed fields.
	pub fn fields(&self) -> &F {
		&self.fields
	}

	/// The record exactly as received.
	pub fn raw(&self) -> &Value {
		&self.raw
	}

	/// Unwraps the record exactly as received.
	pub fn into_raw(self) -> Value {
		self.raw
	}
}
impl<F> PartialEq for ProviderItem<F> {
	fn eq(&self, other: &Self) -> bool {
		self.raw == other.raw
	}
}
impl<F> Serialize for ProviderItem<F> {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		self.raw.serialize(serializer)
	}
}
impl<'de, F> Deserialize<'de> for ProviderItem<F>
where
	F: DeserializeOwned,
{
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_map(ObjectVisitor(PhantomData))
	}
}

struct ObjectVisitor<F>(PhantomData<F>);
impl<'de, F> Visitor<'de> for ObjectVisitor<F>
where
	F: DeserializeOwned,
{
	type Value = ProviderItem<F>;

	fn expecting(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("a provider JSON object")
	}

	fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
	where
		A: MapAccess<'de>,
	{
		let mut object = serde_json::Map::new();

		while let Some((key, value)) = map.next_entry::<String, Value>()? {
			object.insert(key, value);
		}

		ProviderItem::from_value(Value::Object(object)).map_err(A::Error::custom)
	}
}

/// Fields read from a GitHub issue.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IssueFields {
	/// Issue number within its repository.
	pub number: Option<u64>,
	/// Reaction rollup on the issue body.
	pub reactions: Option<Reactions>,
}

/// Fields read from a GitHub issue comment.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommentFields {
	/// Comment identifier.
	pub id: Option<u64>,
	/// Reaction rollup on the comment.
	pub reactions: Option<Reactions>,
}

/// Fields read from a Stack Overflow question.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QuestionFields {
	/// Question identifier.
	pub question_id: Option<u64>,
	/// Identifier of the answer the asker accepted, if any.
	pub accepted_answer_id: Option<u64>,
}

/// Fields read from a Stack Overflow answer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnswerFields {
	/// Answer identifier.
	pub answer_id: Option<u64>,
	/// Question the answer belongs to.
	pub question_id: Option<u64>,
}

/// GitHub issue.
pub type Issue = ProviderItem<IssueFields>;
/// GitHub issue comment.
pub type Comment = ProviderItem<CommentFields>;
/// Stack Overflow question.
pub type Question = ProviderItem<QuestionFields>;
/// Stack Overflow answer.
pub type Answer = ProviderItem<AnswerFields>;

impl Issue {
	/// Reaction rollup on the issue body; zero when absent.
	pub fn reactions(&self) -> Reactions {
		self.fields.reactions.unwrap_or_default()
	}
}

impl Comment {
	/// Reaction rollup on the comment; zero when absent.
	pub fn reactions(&self) -> Reactions {
		self.fields.reactions.unwrap_or_default()
	}

	/// Ranking score of the comment.
	pub fn score(&self) -> u64 {
		self.reactions().score()
	}
}
