//! Flattening of image rows into the pixel buffer handed to the model.
//!
//! The buffer has no header. Its meaning is fixed by [`ImageShape`] and the
//! [`PixelLayout`]:
//!
//! - planar (default): row `r`, channel `c`, pixel `p` at `r*C*W + c*W + p`
//! - interleaved: row `r`, pixel `p`, channel `c` at `r*C*W + p*C + c`
//!
//! where `C` counts the base channels plus one extra channel per merged
//! alt-aligned row set.

use std::fmt::{self, Display};

use ndarray::ArrayView3;

use pileup_core::ImageRow;

use crate::config::{AltAlignedPileup, PileupImageOptions, PixelLayout};
use crate::error::{PileupError, Result};

/// Most alt-aligned row sets a single image can carry (one per allele of a het-alt pair).
pub const MAX_ALT_ROW_SETS: usize = 2;

/// Dimensions of an assembled pileup buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImageShape {
    /// number of evidence rows
    pub height: usize,
    pub width: usize,
    pub channels: usize,
}

impl ImageShape {
    pub fn new(height: usize, width: usize, channels: usize) -> Self {
        ImageShape {
            height,
            width,
            channels,
        }
    }

    /// Number of bytes in a buffer of this shape.
    pub fn len(&self) -> usize {
        self.height * self.width * self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channels
    }

    /// Offset of a value in a flat buffer of this shape.
    pub fn offset(&self, layout: PixelLayout, row: usize, position: usize, channel: usize) -> usize {
        let row_start = row * self.row_len();
        match layout {
            PixelLayout::Interleaved => row_start + position * self.channels + channel,
            PixelLayout::Planar => row_start + channel * self.width + position,
        }
    }
}

impl Display for ImageShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.height, self.width, self.channels)
    }
}

///
/// Merges base rows and alt-aligned row sets into one flat pixel buffer.
///
/// With [`AltAlignedPileup::None`], or when no alt row sets are supplied, the
/// output holds the base channels only. Otherwise each alt set contributes
/// one extra channel per row, appended after the base channels in set order:
/// its first channel for `base_channels`, its diff channel for
/// `diff_channels`. Extracted values are copied unchanged.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PileupAssembler {
    mode: AltAlignedPileup,
    layout: PixelLayout,
    /// channel copied in `diff_channels` mode; last channel when unset
    diff_channel: Option<usize>,
}

impl PileupAssembler {
    pub fn new(mode: AltAlignedPileup) -> Self {
        PileupAssembler {
            mode,
            layout: PixelLayout::default(),
            diff_channel: None,
        }
    }

    pub fn from_options(options: &PileupImageOptions) -> Self {
        PileupAssembler {
            mode: options.alt_aligned_pileup,
            layout: options.pixel_layout,
            diff_channel: options.diff_channel,
        }
    }

    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_diff_channel(mut self, channel: usize) -> Self {
        self.diff_channel = Some(channel);
        self
    }

    pub fn mode(&self) -> AltAlignedPileup {
        self.mode
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    ///
    /// Clear `out` and fill it with the pileup of `base_rows`, merging
    /// `alt_row_sets` according to the duplication mode.
    ///
    /// Every alt set must have as many rows as `base_rows`, and every row must
    /// share the width and channel count of the first base row.
    ///
    pub fn fill(
        &self,
        base_rows: &[ImageRow],
        alt_row_sets: &[Vec<ImageRow>],
        out: &mut Vec<u8>,
    ) -> Result<ImageShape> {
        let first = base_rows.first().ok_or(PileupError::EmptyPileup)?;
        let width = first.width();
        let num_channels = first.num_channels();
        check_dimensions("base", base_rows, width, num_channels)?;

        let alt_row_sets = match self.mode {
            AltAlignedPileup::None => &[][..],
            _ => alt_row_sets,
        };
        if alt_row_sets.len() > MAX_ALT_ROW_SETS {
            return Err(PileupError::TooManyAltRowSets(alt_row_sets.len()));
        }
        for (set, rows) in alt_row_sets.iter().enumerate() {
            if rows.len() != base_rows.len() {
                return Err(PileupError::AltRowCountMismatch {
                    set,
                    expected: base_rows.len(),
                    found: rows.len(),
                });
            }
            check_dimensions(&format!("alt set {}", set), rows, width, num_channels)?;
        }

        let extra_channel = match self.mode {
            AltAlignedPileup::None | AltAlignedPileup::BaseChannels => 0,
            AltAlignedPileup::DiffChannels => self
                .diff_channel
                .unwrap_or(num_channels.saturating_sub(1)),
        };
        if !alt_row_sets.is_empty() && extra_channel >= num_channels {
            return Err(PileupError::ChannelOutOfRange {
                channel: extra_channel,
                num_channels,
            });
        }

        let shape = ImageShape::new(base_rows.len(), width, num_channels + alt_row_sets.len());
        out.clear();
        out.reserve(shape.len());

        for (r, base) in base_rows.iter().enumerate() {
            match self.layout {
                PixelLayout::Interleaved => {
                    for p in 0..width {
                        out.extend(base.channels().map(|pixels| pixels[p]));
                        out.extend(alt_row_sets.iter().map(|rows| rows[r].pixel(extra_channel, p)));
                    }
                }
                PixelLayout::Planar => {
                    for pixels in base.channels() {
                        out.extend_from_slice(pixels);
                    }
                    for rows in alt_row_sets {
                        out.extend_from_slice(rows[r].channel(extra_channel));
                    }
                }
            }
        }

        Ok(shape)
    }

    /// Like [`PileupAssembler::fill`], into a freshly allocated image.
    pub fn assemble(&self, base_rows: &[ImageRow], alt_row_sets: &[Vec<ImageRow>]) -> Result<PileupImage> {
        let mut data = Vec::new();
        let shape = self.fill(base_rows, alt_row_sets, &mut data)?;
        Ok(PileupImage {
            data,
            shape,
            layout: self.layout,
        })
    }
}

fn check_dimensions(label: &str, rows: &[ImageRow], width: usize, channels: usize) -> Result<()> {
    for (row, image_row) in rows.iter().enumerate() {
        if image_row.width() != width || image_row.num_channels() != channels {
            return Err(PileupError::DimensionMismatch {
                rows: label.to_string(),
                row,
                width,
                channels,
                found_width: image_row.width(),
                found_channels: image_row.num_channels(),
            });
        }
    }
    Ok(())
}

///
/// Fill `out` with the planar pileup of `base_rows`, taking the last
/// channel of each alt set in `diff_channels` mode.
///
pub fn fill_pileup_array(
    base_rows: &[ImageRow],
    alt_row_sets: &[Vec<ImageRow>],
    mode: AltAlignedPileup,
    out: &mut Vec<u8>,
) -> Result<ImageShape> {
    PileupAssembler::new(mode).fill(base_rows, alt_row_sets, out)
}

/// An assembled pileup that owns its pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PileupImage {
    pub data: Vec<u8>,
    pub shape: ImageShape,
    pub layout: PixelLayout,
}

impl PileupImage {
    ///
    /// View the buffer as a 3D array: `[height, width, channels]` when
    /// interleaved, `[height, channels, width]` when planar.
    ///
    pub fn as_array(&self) -> Result<ArrayView3<'_, u8>> {
        as_array(&self.data, self.shape, self.layout)
    }

    pub fn pixel(&self, row: usize, position: usize, channel: usize) -> Option<u8> {
        if row >= self.shape.height || position >= self.shape.width || channel >= self.shape.channels {
            return None;
        }
        self.data
            .get(self.shape.offset(self.layout, row, position, channel))
            .copied()
    }
}

pub(crate) fn as_array(data: &[u8], shape: ImageShape, layout: PixelLayout) -> Result<ArrayView3<'_, u8>> {
    let dims = match layout {
        PixelLayout::Interleaved => (shape.height, shape.width, shape.channels),
        PixelLayout::Planar => (shape.height, shape.channels, shape.width),
    };
    Ok(ArrayView3::from_shape(dims, data)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    const WIDTH: usize = 5;
    const NUM_CHANNELS: usize = 7;

    /// Row whose channel `c` holds `values[c]` at every position.
    fn constant_row(values: &[u8]) -> ImageRow {
        ImageRow::from_channels(values.iter().map(|v| vec![*v; WIDTH]).collect()).unwrap()
    }

    /// Repeat each row's pixel `WIDTH` times, as an interleaved buffer.
    fn interleaved(pixels_per_row: Vec<Vec<u8>>) -> Vec<u8> {
        pixels_per_row
            .into_iter()
            .flat_map(|pixel| std::iter::repeat_n(pixel, WIDTH).flatten())
            .collect()
    }

    /// Fill in the `[height, width, channels]` order the fixtures are written in.
    fn fill_interleaved(
        base_rows: &[ImageRow],
        alt_row_sets: &[Vec<ImageRow>],
        mode: AltAlignedPileup,
        out: &mut Vec<u8>,
    ) -> Result<ImageShape> {
        PileupAssembler::new(mode)
            .with_layout(PixelLayout::Interleaved)
            .fill(base_rows, alt_row_sets, out)
    }

    #[fixture]
    fn base_rows() -> Vec<ImageRow> {
        (1..=3)
            .map(|k| constant_row(&[10 + k, 20 + k, 30 + k, 40 + k, 50 + k, 60 + k, 70 + k]))
            .collect()
    }

    /// Two alt sets: channel 0 and channel 5 carry the base values shifted by
    /// -5 (first set) and +5 (second set); everything else is 1.
    #[fixture]
    fn alt_row_sets() -> Vec<Vec<ImageRow>> {
        vec![
            (1..=3)
                .map(|k| constant_row(&[10 + k - 5, 1, 1, 1, 1, 60 + k - 5, 1]))
                .collect(),
            (1..=3)
                .map(|k| constant_row(&[10 + k + 5, 1, 1, 1, 1, 60 + k + 5, 1]))
                .collect(),
        ]
    }

    fn expected_none() -> Vec<u8> {
        interleaved(vec![
            vec![11, 21, 31, 41, 51, 61, 71],
            vec![12, 22, 32, 42, 52, 62, 72],
            vec![13, 23, 33, 43, 53, 63, 73],
        ])
    }

    #[rstest]
    fn test_none_without_alt_rows(base_rows: Vec<ImageRow>) {
        let mut out = Vec::new();
        let shape = fill_interleaved(&base_rows, &[], AltAlignedPileup::None, &mut out).unwrap();

        assert_eq!(shape, ImageShape::new(3, WIDTH, NUM_CHANNELS));
        assert_eq!(out, expected_none());
    }

    #[rstest]
    fn test_none_ignores_alt_rows(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let mut out = Vec::new();
        fill_interleaved(&base_rows, &alt_row_sets, AltAlignedPileup::None, &mut out).unwrap();
        assert_eq!(out, expected_none());
    }

    #[rstest]
    fn test_diff_channels(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let assembler = PileupAssembler::new(AltAlignedPileup::DiffChannels)
            .with_layout(PixelLayout::Interleaved)
            .with_diff_channel(5);
        let mut out = Vec::new();
        let shape = assembler.fill(&base_rows, &alt_row_sets, &mut out).unwrap();

        assert_eq!(shape, ImageShape::new(3, WIDTH, NUM_CHANNELS + 2));
        assert_eq!(
            out,
            interleaved(vec![
                vec![11, 21, 31, 41, 51, 61, 71, 61 - 5, 61 + 5],
                vec![12, 22, 32, 42, 52, 62, 72, 62 - 5, 62 + 5],
                vec![13, 23, 33, 43, 53, 63, 73, 63 - 5, 63 + 5],
            ])
        );
    }

    #[rstest]
    fn test_base_channels(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let mut out = Vec::new();
        let shape =
            fill_interleaved(&base_rows, &alt_row_sets, AltAlignedPileup::BaseChannels, &mut out)
                .unwrap();

        assert_eq!(shape.channels, NUM_CHANNELS + 2);
        assert_eq!(
            out,
            interleaved(vec![
                vec![11, 21, 31, 41, 51, 61, 71, 11 - 5, 11 + 5],
                vec![12, 22, 32, 42, 52, 62, 72, 12 - 5, 12 + 5],
                vec![13, 23, 33, 43, 53, 63, 73, 13 - 5, 13 + 5],
            ])
        );
    }

    #[rstest]
    fn test_diff_channels_defaults_to_last_channel(
        base_rows: Vec<ImageRow>,
        alt_row_sets: Vec<Vec<ImageRow>>,
    ) {
        let mut out = Vec::new();
        fill_interleaved(&base_rows, &alt_row_sets, AltAlignedPileup::DiffChannels, &mut out)
            .unwrap();

        // channel 6 of every alt row is 1
        assert_eq!(&out[7..9], &[1, 1]);
    }

    #[rstest]
    #[case(AltAlignedPileup::None)]
    #[case(AltAlignedPileup::BaseChannels)]
    #[case(AltAlignedPileup::DiffChannels)]
    fn test_no_alt_sets_matches_none(base_rows: Vec<ImageRow>, #[case] mode: AltAlignedPileup) {
        let mut out = Vec::new();
        let shape = fill_interleaved(&base_rows, &[], mode, &mut out).unwrap();
        assert_eq!(shape.channels, NUM_CHANNELS);
        assert_eq!(out, expected_none());
    }

    #[rstest]
    #[case(AltAlignedPileup::None, 0, NUM_CHANNELS)]
    #[case(AltAlignedPileup::None, 2, NUM_CHANNELS)]
    #[case(AltAlignedPileup::BaseChannels, 1, NUM_CHANNELS + 1)]
    #[case(AltAlignedPileup::BaseChannels, 2, NUM_CHANNELS + 2)]
    #[case(AltAlignedPileup::DiffChannels, 1, NUM_CHANNELS + 1)]
    #[case(AltAlignedPileup::DiffChannels, 2, NUM_CHANNELS + 2)]
    fn test_channel_math(
        base_rows: Vec<ImageRow>,
        alt_row_sets: Vec<Vec<ImageRow>>,
        #[case] mode: AltAlignedPileup,
        #[case] num_sets: usize,
        #[case] expected_channels: usize,
    ) {
        let mut out = Vec::new();
        let shape = fill_pileup_array(&base_rows, &alt_row_sets[..num_sets], mode, &mut out).unwrap();

        assert_eq!(shape.channels, expected_channels);
        assert_eq!(out.len(), base_rows.len() * WIDTH * expected_channels);
        assert_eq!(out.len(), shape.len());
    }

    #[rstest]
    fn test_default_layout_is_channel_major() {
        let rows = vec![ImageRow::from_channels(vec![vec![1, 2, 3], vec![4, 5, 6]]).unwrap()];
        let mut out = Vec::new();
        let shape = fill_pileup_array(&rows, &[], AltAlignedPileup::None, &mut out).unwrap();

        assert_eq!(out, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(PileupAssembler::new(AltAlignedPileup::None).layout(), PixelLayout::Planar);
        for (c, p) in [(0, 0), (0, 2), (1, 1)] {
            let offset = shape.offset(PixelLayout::Planar, 0, p, c);
            assert_eq!(offset, c * shape.width + p);
            assert_eq!(out[offset], rows[0].pixel(c, p));
        }
    }

    #[rstest]
    fn test_default_layout_with_alt_sets(
        base_rows: Vec<ImageRow>,
        alt_row_sets: Vec<Vec<ImageRow>>,
    ) {
        let mut out = Vec::new();
        let shape =
            fill_pileup_array(&base_rows, &alt_row_sets, AltAlignedPileup::BaseChannels, &mut out)
                .unwrap();

        // row r, channel c, pixel p at r*C*W + c*W + p
        let channels = shape.channels;
        assert_eq!(channels, NUM_CHANNELS + 2);
        for r in 0..3 {
            for p in 0..WIDTH {
                let k = r as u8 + 1;
                assert_eq!(out[r * channels * WIDTH + p], 10 + k);
                assert_eq!(out[r * channels * WIDTH + 6 * WIDTH + p], 70 + k);
                assert_eq!(out[r * channels * WIDTH + 7 * WIDTH + p], 10 + k - 5);
                assert_eq!(out[r * channels * WIDTH + 8 * WIDTH + p], 10 + k + 5);
            }
        }
    }

    #[rstest]
    fn test_planar_layout(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let assembler = PileupAssembler::new(AltAlignedPileup::DiffChannels)
            .with_layout(PixelLayout::Planar)
            .with_diff_channel(5);
        let image = assembler.assemble(&base_rows, &alt_row_sets).unwrap();

        let row_len = WIDTH * (NUM_CHANNELS + 2);
        assert_eq!(&image.data[0..WIDTH], &[11; WIDTH]);
        assert_eq!(&image.data[WIDTH..2 * WIDTH], &[21; WIDTH]);
        assert_eq!(&image.data[7 * WIDTH..8 * WIDTH], &[56; WIDTH]);
        assert_eq!(&image.data[8 * WIDTH..row_len], &[66; WIDTH]);
        assert_eq!(&image.data[row_len..row_len + WIDTH], &[12; WIDTH]);

        let array = image.as_array().unwrap();
        assert_eq!(array.shape(), &[3, NUM_CHANNELS + 2, WIDTH]);
        assert_eq!(array[[2, 8, 4]], 68);
    }

    #[rstest]
    fn test_layouts_agree_on_pixels(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let interleaved = PileupAssembler::new(AltAlignedPileup::BaseChannels)
            .with_layout(PixelLayout::Interleaved)
            .assemble(&base_rows, &alt_row_sets)
            .unwrap();
        let planar = PileupAssembler::new(AltAlignedPileup::BaseChannels)
            .assemble(&base_rows, &alt_row_sets)
            .unwrap();
        assert_eq!(planar.layout, PixelLayout::Planar);

        for row in 0..3 {
            for position in 0..WIDTH {
                for channel in 0..NUM_CHANNELS + 2 {
                    assert_eq!(
                        interleaved.pixel(row, position, channel),
                        planar.pixel(row, position, channel)
                    );
                }
            }
        }
        assert_eq!(interleaved.pixel(3, 0, 0), None);

        let array = interleaved.as_array().unwrap();
        assert_eq!(array.shape(), &[3, WIDTH, NUM_CHANNELS + 2]);
        assert_eq!(array[[1, 0, 7]], 7);
    }

    #[rstest]
    fn test_buffer_is_reused(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let mut out = vec![255; 1000];
        fill_interleaved(&base_rows, &alt_row_sets, AltAlignedPileup::BaseChannels, &mut out)
            .unwrap();
        fill_interleaved(&base_rows, &alt_row_sets, AltAlignedPileup::None, &mut out).unwrap();
        assert_eq!(out, expected_none());
    }

    #[rstest]
    fn test_empty_pileup() {
        let mut out = Vec::new();
        let result = fill_pileup_array(&[], &[], AltAlignedPileup::None, &mut out);
        assert!(matches!(result, Err(PileupError::EmptyPileup)));
    }

    #[rstest]
    fn test_base_dimension_mismatch(mut base_rows: Vec<ImageRow>) {
        base_rows.push(ImageRow::new(WIDTH + 1, NUM_CHANNELS));
        let mut out = Vec::new();
        let result = fill_pileup_array(&base_rows, &[], AltAlignedPileup::None, &mut out);
        assert!(matches!(
            result,
            Err(PileupError::DimensionMismatch {
                row: 3,
                found_width: 6,
                ..
            })
        ));
    }

    #[rstest]
    fn test_alt_dimension_mismatch(base_rows: Vec<ImageRow>, mut alt_row_sets: Vec<Vec<ImageRow>>) {
        alt_row_sets[1][2] = ImageRow::new(WIDTH, NUM_CHANNELS - 1);
        let mut out = Vec::new();
        let result =
            fill_pileup_array(&base_rows, &alt_row_sets, AltAlignedPileup::DiffChannels, &mut out);
        match result {
            Err(PileupError::DimensionMismatch {
                rows,
                row,
                found_channels,
                ..
            }) => {
                assert_eq!(rows, "alt set 1");
                assert_eq!(row, 2);
                assert_eq!(found_channels, NUM_CHANNELS - 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[rstest]
    fn test_alt_row_count_mismatch(base_rows: Vec<ImageRow>, mut alt_row_sets: Vec<Vec<ImageRow>>) {
        alt_row_sets[0].pop();
        let mut out = Vec::new();
        let result =
            fill_pileup_array(&base_rows, &alt_row_sets, AltAlignedPileup::BaseChannels, &mut out);
        assert!(matches!(
            result,
            Err(PileupError::AltRowCountMismatch {
                set: 0,
                expected: 3,
                found: 2
            })
        ));
    }

    #[rstest]
    fn test_too_many_alt_sets(base_rows: Vec<ImageRow>, mut alt_row_sets: Vec<Vec<ImageRow>>) {
        alt_row_sets.push(alt_row_sets[0].clone());
        let mut out = Vec::new();
        let result =
            fill_pileup_array(&base_rows, &alt_row_sets, AltAlignedPileup::BaseChannels, &mut out);
        assert!(matches!(result, Err(PileupError::TooManyAltRowSets(3))));
    }

    #[rstest]
    fn test_diff_channel_out_of_range(base_rows: Vec<ImageRow>, alt_row_sets: Vec<Vec<ImageRow>>) {
        let assembler = PileupAssembler::new(AltAlignedPileup::DiffChannels).with_diff_channel(7);
        let mut out = Vec::new();
        let result = assembler.fill(&base_rows, &alt_row_sets, &mut out);
        assert!(matches!(
            result,
            Err(PileupError::ChannelOutOfRange {
                channel: 7,
                num_channels: 7
            })
        ));
    }

    #[rstest]
    fn test_from_options() {
        let options = PileupImageOptions {
            alt_aligned_pileup: AltAlignedPileup::DiffChannels,
            pixel_layout: PixelLayout::Planar,
            diff_channel: Some(3),
            ..Default::default()
        };
        let assembler = PileupAssembler::from_options(&options);
        assert_eq!(
            assembler,
            PileupAssembler::new(AltAlignedPileup::DiffChannels)
                .with_layout(PixelLayout::Planar)
                .with_diff_channel(3)
        );
        assert_eq!(ImageShape::new(2, 3, 4).to_string(), "2x3x4");
    }
}
