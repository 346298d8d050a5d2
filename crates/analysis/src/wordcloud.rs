//! Word cloud layout and rendering.
//!
//! Words are counted, sized by relative frequency, and placed greedily from the
//! most frequent down. Each word lands on a random free spot of the canvas; when
//! none is left the font shrinks until the minimum size, where layout stops.

use crate::error::{AnalysisError, AnalysisResult};
use crate::nlp::reshape_for_display;
use ab_glyph::{FontVec, PxScale};
use chatstats_core::config::WordCloudConfig;
use chatstats_core::constants::WORD_CLOUD_FILE_NAME;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Measures the pixel size of a run of text.
pub trait TextMeasurer {
    /// Width and height of `text` drawn at `font_size` pixels.
    fn measure(&self, text: &str, font_size: f32) -> (u32, u32);
}

impl TextMeasurer for FontVec {
    fn measure(&self, text: &str, font_size: f32) -> (u32, u32) {
        text_size(PxScale::from(font_size), self, text)
    }
}

/// A word positioned on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    /// Word as counted.
    pub word: String,
    /// Shaped, visually ordered form that gets drawn.
    pub display: String,
    /// Font size in pixels.
    pub font_size: u32,
    /// Left edge of the text.
    pub x: u32,
    /// Top edge of the text.
    pub y: u32,
    /// Text width.
    pub width: u32,
    /// Text height.
    pub height: u32,
    /// Fill color.
    pub color: [u8; 3],
}

/// Word counter for the cloud. Words are runs of two or more word characters,
/// apostrophes allowed after the first.
#[derive(Debug, Clone)]
pub struct WordCounter {
    word_regex: Regex,
}

impl WordCounter {
    /// Create a new WordCounter.
    pub fn new() -> AnalysisResult<Self> {
        Ok(Self {
            word_regex: Regex::new(r"\w[\w']+").map_err(|e| AnalysisError::Nlp(e.to_string()))?,
        })
    }

    /// Count words in `text` and scale counts to the most frequent one.
    ///
    /// Words are matched case-insensitively and shown in their first spelling.
    /// Pure numbers are dropped and a trailing `'s` is removed. The result is
    /// sorted by descending frequency, ties in order of first appearance, and
    /// holds at most `max_words` entries.
    pub fn frequencies(&self, text: &str, max_words: usize) -> Vec<(String, f32)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for found in self.word_regex.find_iter(text) {
            let word = found.as_str();
            let word = word.strip_suffix("'s").unwrap_or(word);
            if word.chars().all(char::is_numeric) {
                continue;
            }

            let key = word.to_lowercase();
            match index.get(&key) {
                Some(&slot) => counts[slot].1 += 1,
                None => {
                    index.insert(key, counts.len());
                    counts.push((word.to_string(), 1));
                }
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(max_words);

        let max = counts.first().map(|(_, count)| *count).unwrap_or(1) as f32;
        counts
            .into_iter()
            .map(|(word, count)| (word, count as f32 / max))
            .collect()
    }
}

/// Cell counts of the occupancy grid and of its summed-area table, or `None`
/// when either does not fit in `u32`.
fn grid_cells(width: u32, height: u32) -> Option<(usize, usize)> {
    let cells = width.checked_mul(height)?;
    let integral = width.checked_add(1)?.checked_mul(height.checked_add(1)?)?;
    Some((cells as usize, integral as usize))
}

/// Check a word cloud configuration without needing a font.
pub fn validate_config(config: &WordCloudConfig) -> AnalysisResult<()> {
    if config.width == 0 || config.height == 0 {
        return Err(AnalysisError::Config(
            "word cloud width and height must be positive".to_string(),
        ));
    }
    if grid_cells(config.width, config.height).is_none() {
        return Err(AnalysisError::Config(format!(
            "word cloud canvas {}x{} is too large",
            config.width, config.height
        )));
    }
    if config.min_font_size == 0 {
        return Err(AnalysisError::Config(
            "min_font_size must be at least 1".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&config.relative_scaling) {
        return Err(AnalysisError::Config(format!(
            "relative_scaling must be between 0 and 1, got {}",
            config.relative_scaling
        )));
    }
    parse_color(&config.background)?;
    Ok(())
}

/// Occupancy of the canvas with a summed-area table for box queries.
struct OccupancyGrid {
    width: u32,
    height: u32,
    occupied: Vec<bool>,
    integral: Vec<u32>,
}

impl OccupancyGrid {
    fn new(width: u32, height: u32) -> AnalysisResult<Self> {
        let (cells, integral_cells) = grid_cells(width, height).ok_or_else(|| {
            AnalysisError::Config(format!("word cloud canvas {}x{} is too large", width, height))
        })?;
        Ok(Self {
            width,
            height,
            occupied: vec![false; cells],
            integral: vec![0; integral_cells],
        })
    }

    fn integral_at(&self, x: u32, y: u32) -> u32 {
        self.integral[(y * (self.width + 1) + x) as usize]
    }

    fn box_sum(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        self.integral_at(x + w, y + h) + self.integral_at(x, y)
            - self.integral_at(x + w, y)
            - self.integral_at(x, y + h)
    }

    /// Pick a uniformly random top-left corner where a `w` x `h` box is free.
    fn sample_free_position(&self, w: u32, h: u32, rng: &mut fastrand::Rng) -> Option<(u32, u32)> {
        if w == 0 || h == 0 || w > self.width || h > self.height {
            return None;
        }

        let free_at = |x: u32, y: u32| self.box_sum(x, y, w, h) == 0;
        let positions = || {
            (0..=self.height - h).flat_map(move |y| (0..=self.width - w).map(move |x| (x, y)))
        };

        let free = positions().filter(|&(x, y)| free_at(x, y)).count();
        if free == 0 {
            return None;
        }
        let pick = rng.usize(..free);
        positions().filter(|&(x, y)| free_at(x, y)).nth(pick)
    }

    fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        let x_end = (x + w).min(self.width);
        let y_end = (y + h).min(self.height);
        for row in y..y_end {
            for col in x..x_end {
                self.occupied[(row * self.width + col) as usize] = true;
            }
        }
        self.rebuild_integral();
    }

    fn rebuild_integral(&mut self) {
        let stride = (self.width + 1) as usize;
        for y in 0..self.height as usize {
            let mut row_sum = 0;
            for x in 0..self.width as usize {
                row_sum += u32::from(self.occupied[y * self.width as usize + x]);
                self.integral[(y + 1) * stride + x + 1] = self.integral[y * stride + x + 1] + row_sum;
            }
        }
    }
}

/// Place words on a `config.width` x `config.height` canvas.
///
/// `frequencies` must be sorted by descending frequency, as returned by
/// [`WordCounter::frequencies`]. Fails when the configuration is invalid.
pub fn layout<M: TextMeasurer>(
    config: &WordCloudConfig,
    frequencies: &[(String, f32)],
    measurer: &M,
) -> AnalysisResult<Vec<PlacedWord>> {
    validate_config(config)?;
    let mut grid = OccupancyGrid::new(config.width, config.height)?;
    let mut rng = fastrand::Rng::with_seed(config.seed);
    let font_step = config.font_step.max(1);
    let scaling = config.relative_scaling;

    let mut placed = Vec::with_capacity(frequencies.len());
    let mut font_size = config.max_font_size.unwrap_or(config.height);
    let mut last_freq = 1.0f32;

    'words: for (index, (word, freq)) in frequencies.iter().enumerate() {
        if index > 0 && scaling != 0.0 {
            let factor = scaling * (freq / last_freq) + (1.0 - scaling);
            font_size = (factor * font_size as f32).round() as u32;
        }

        let display = reshape_for_display(word);
        loop {
            if font_size == 0 || font_size < config.min_font_size {
                warn!(
                    "Word cloud canvas full after {} of {} words",
                    placed.len(),
                    frequencies.len()
                );
                break 'words;
            }

            let (width, height) = measurer.measure(&display, font_size as f32);
            let box_w = width + config.margin;
            let box_h = height + config.margin;
            if let Some((x, y)) = grid.sample_free_position(box_w, box_h, &mut rng) {
                grid.occupy(x, y, box_w, box_h);
                placed.push(PlacedWord {
                    word: word.clone(),
                    display,
                    font_size,
                    x: x + config.margin / 2,
                    y: y + config.margin / 2,
                    width,
                    height,
                    color: random_color(&mut rng),
                });
                break;
            }
            font_size = font_size.saturating_sub(font_step);
        }

        last_freq = *freq;
    }

    debug!("Placed {} words", placed.len());
    Ok(placed)
}

/// Random hue at 80% saturation and 50% lightness.
fn random_color(rng: &mut fastrand::Rng) -> [u8; 3] {
    hsl_to_rgb(f32::from(rng.u8(..)), 0.8, 0.5)
}

fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = (hue % 360.0) / 60.0;
    let second = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, second, 0.0),
        1 => (second, chroma, 0.0),
        2 => (0.0, chroma, second),
        3 => (0.0, second, chroma),
        4 => (second, 0.0, chroma),
        _ => (chroma, 0.0, second),
    };
    let offset = lightness - chroma / 2.0;
    let channel = |v: f32| ((v + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    [channel(r), channel(g), channel(b)]
}

/// Parse a color name (`white`, `black`, ...) or a `#rrggbb` hex string.
pub fn parse_color(value: &str) -> AnalysisResult<Rgb<u8>> {
    let value = value.trim().to_lowercase();
    let named = match value.as_str() {
        "white" => Some([255, 255, 255]),
        "black" => Some([0, 0, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        "red" => Some([255, 0, 0]),
        "green" => Some([0, 128, 0]),
        "blue" => Some([0, 0, 255]),
        "yellow" => Some([255, 255, 0]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(Rgb(rgb));
    }

    let hex = value
        .strip_prefix('#')
        .filter(|hex| hex.len() == 6)
        .ok_or_else(|| AnalysisError::Config(format!("unsupported color: {}", value)))?;
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16)
            .map_err(|_| AnalysisError::Config(format!("unsupported color: {}", value)))
    };
    Ok(Rgb([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
}

/// Word cloud renderer bound to a font.
pub struct WordCloud {
    config: WordCloudConfig,
    counter: WordCounter,
    font: FontVec,
}

impl WordCloud {
    /// Create a renderer, validating the configuration.
    pub fn new(config: WordCloudConfig, font: FontVec) -> AnalysisResult<Self> {
        validate_config(&config)?;
        Ok(Self {
            config,
            counter: WordCounter::new()?,
            font,
        })
    }

    /// Create a renderer from a TrueType/OpenType font file.
    pub fn from_font_file(config: WordCloudConfig, path: &Path) -> AnalysisResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            AnalysisError::Font(format!("failed to read font {}: {}", path.display(), e))
        })?;
        let font = FontVec::try_from_vec(bytes)
            .map_err(|e| AnalysisError::Font(format!("{}: {}", path.display(), e)))?;
        Self::new(config, font)
    }

    /// Rendering configuration.
    pub fn config(&self) -> &WordCloudConfig {
        &self.config
    }

    /// Lay out the words of `text` without drawing them.
    pub fn layout(&self, text: &str) -> AnalysisResult<Vec<PlacedWord>> {
        let frequencies = self.counter.frequencies(text, self.config.max_words);
        if frequencies.is_empty() {
            return Err(AnalysisError::EmptyCorpus);
        }
        layout(&self.config, &frequencies, &self.font)
    }

    /// Render the word cloud of `text` into an image.
    pub fn render(&self, text: &str) -> AnalysisResult<RgbImage> {
        let placed = self.layout(text)?;
        let background = parse_color(&self.config.background)?;
        let mut image = RgbImage::from_pixel(self.config.width, self.config.height, background);

        for word in &placed {
            draw_text_mut(
                &mut image,
                Rgb(word.color),
                word.x as i32,
                word.y as i32,
                PxScale::from(word.font_size as f32),
                &self.font,
                &word.display,
            );
        }
        Ok(image)
    }

    /// Render the word cloud of `text` to `word_cloud.png` inside `output_dir`.
    ///
    /// The directory is created when missing. Returns the written path.
    pub fn render_to_dir(&self, text: &str, output_dir: &Path) -> AnalysisResult<PathBuf> {
        let image = self.render(text)?;
        std::fs::create_dir_all(output_dir)?;
        let path = output_dir.join(WORD_CLOUD_FILE_NAME);
        image.save(&path)?;
        info!("Word cloud written to {}", path.display());
        Ok(path)
    }
}
