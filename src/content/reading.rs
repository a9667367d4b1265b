//! Reading time estimation

use lazy_static::lazy_static;
use regex::Regex;

use super::post::ContentBlock;

/// Default reading speed
pub const WORDS_PER_MINUTE: usize = 200;

lazy_static! {
    static ref WORD_SEPARATORS: Regex = Regex::new(r"[\s,;:.?!()]+").unwrap();
}

/// Count the words in a piece of plain text
pub fn count_words(text: &str) -> usize {
    WORD_SEPARATORS
        .split(text)
        .filter(|word| !word.is_empty())
        .count()
}

/// Words across the bodies of all blocks (headings are not counted)
pub fn body_word_count(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| count_words(&block.body.as_text()))
        .sum()
}

/// Estimated minutes to read the given blocks, rounded up.
///
/// Zero words is zero minutes; any words take at least one minute.
pub fn reading_time(blocks: &[ContentBlock], words_per_minute: usize) -> usize {
    let words = body_word_count(blocks);
    words.div_ceil(words_per_minute.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::rich_text::{Fragment, RichText};

    fn block_with_words(words: usize) -> ContentBlock {
        let text = vec!["palavra"; words].join(" ");
        ContentBlock {
            heading: "Heading words are ignored".to_string(),
            body: RichText::new(vec![Fragment::paragraph(text)]),
        }
    }

    #[test]
    fn test_count_words_splits_on_punctuation() {
        assert_eq!(count_words("Hello, world! (really)   ok;no:yes.maybe?"), 7);
        assert_eq!(count_words("line one\nline two\ttab"), 5);
        assert_eq!(count_words(" ,.;  "), 0);
    }

    #[test]
    fn test_reading_time_boundaries() {
        assert_eq!(reading_time(&[block_with_words(199)], WORDS_PER_MINUTE), 1);
        assert_eq!(reading_time(&[block_with_words(200)], WORDS_PER_MINUTE), 1);
        assert_eq!(reading_time(&[block_with_words(201)], WORDS_PER_MINUTE), 2);
    }

    #[test]
    fn test_reading_time_empty_content_is_zero() {
        assert_eq!(reading_time(&[], WORDS_PER_MINUTE), 0);
        assert_eq!(reading_time(&[block_with_words(0)], WORDS_PER_MINUTE), 0);
    }

    #[test]
    fn test_reading_time_sums_blocks() {
        let blocks = [block_with_words(150), block_with_words(100)];
        assert_eq!(body_word_count(&blocks), 250);
        assert_eq!(reading_time(&blocks, WORDS_PER_MINUTE), 2);
    }

    #[test]
    fn test_single_word_takes_a_minute() {
        assert_eq!(reading_time(&[block_with_words(1)], WORDS_PER_MINUTE), 1);
    }
}
