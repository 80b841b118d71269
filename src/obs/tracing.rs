// self
use crate::{_prelude::*, obs::OperationKind};

/// `thumbsup.op` span covering one issuance, summary, or dispatch call.
///
/// Without the `tracing` feature the span is empty and [`OperationSpan::instrument`] hands the
/// future back untouched.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Opens a span tagged with `op` and the call-site `stage`.
	pub fn new(kind: OperationKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			Self { span: tracing::info_span!("thumbsup.op", op = kind.as_str(), stage) }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Runs `fut` inside the span; nothing is entered across `.await` points.
	pub fn instrument<Fut>(self, fut: Fut) -> impl Future<Output = Fut::Output>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			tracing::Instrument::instrument(fut, self.span)
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			fut
		}
	}
}
