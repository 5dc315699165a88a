//! Durable sinks: where finished conversations are written.
//!
//! Implements the [`DurableSink`](conclave_application::DurableSink) port:
//!
//! - [`JsonFileSink`]: machine-readable transcript, loadable with [`load_transcript`]
//! - [`MarkdownFileSink`]: human-readable transcript
//! - [`TextFileSink`]: plain timestamped lines
//! - [`CompositeSink`]: several of the above at once

mod composite;
mod json;
mod markdown;
mod text;
mod transcript;

pub use composite::CompositeSink;
pub use json::{JSON_TRANSCRIPT_FILE, JsonFileSink};
pub use markdown::{MARKDOWN_TRANSCRIPT_FILE, MarkdownFileSink, render_markdown};
pub use text::{TEXT_TRANSCRIPT_FILE, TextFileSink, render_text};
pub use transcript::{TranscriptError, load_transcript, parse_transcript};
