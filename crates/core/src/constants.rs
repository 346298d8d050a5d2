//! Application constants and configuration defaults.

/// Default number of entries returned by the top-users ranking.
pub const DEFAULT_TOP_N: usize = 10;

/// File name of the rendered word cloud inside the output directory.
pub const WORD_CLOUD_FILE_NAME: &str = "word_cloud.png";

/// Default data directory holding the stop-word list and the font.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default stop-word resource, relative to the data directory.
pub const DEFAULT_STOP_WORDS_FILE: &str = "stop_words.txt";

/// Default font resource, relative to the data directory.
pub const DEFAULT_FONT_FILE: &str = "NotoNaskhArabic-Regular.ttf";

/// Author label used for replies whose sender was exported as `null`.
pub const DELETED_ACCOUNT_NAME: &str = "Deleted Account";

/// Question marks recognized by question detection (Latin and Arabic/Persian).
pub const QUESTION_MARKS: [char; 2] = ['?', '\u{061F}'];
