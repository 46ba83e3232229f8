//! Custom widgets

pub mod rich_text_block;

pub use rich_text_block::{RichTextBlock, RichTextBlockState};
