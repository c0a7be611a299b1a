use image::RgbImage;
use log::{debug, info};
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

use scantron_core::{
    count_marked, validate_answer_key, AnswerKeyEntry, CoordinateIndex, MarkOutcome,
    ValidationError,
};

use crate::error::ImageError;
use crate::render::{composite, Marker};
use crate::style::MarkStyle;

/// Errors returned by [`annotate`]. Per-entry misses are not errors.
#[derive(thiserror::Error, Debug)]
pub enum AnnotateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Reference image with markers composited on top.
///
/// Created once per [`annotate`] call and never modified afterwards.
#[derive(Clone, Debug)]
pub struct AnnotatedImage {
    image: RgbImage,
    markers: Vec<Marker>,
    style: MarkStyle,
}

impl AnnotatedImage {
    #[inline]
    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    /// Markers that were composited, in answer-key order.
    #[inline]
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    #[inline]
    pub fn style(&self) -> &MarkStyle {
        &self.style
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

/// Resolve every entry against `index`, one outcome per entry, in order.
pub fn resolve_outcomes(
    answer_key: &[AnswerKeyEntry],
    index: &CoordinateIndex,
) -> Vec<MarkOutcome> {
    answer_key
        .iter()
        .map(|entry| match index.resolve(&entry.question_id, &entry.answer_label) {
            Some(p) => MarkOutcome::Marked {
                question_id: entry.question_id.clone(),
                answer_label: entry.answer_label.clone(),
                x: p.x,
                y: p.y,
            },
            None => {
                debug!(
                    "no coordinate for Q{} option {}",
                    entry.question_id, entry.answer_label
                );
                MarkOutcome::Unresolved {
                    question_id: entry.question_id.clone(),
                    answer_label: entry.answer_label.clone(),
                }
            }
        })
        .collect()
}

/// Mark `answer_key` on a copy of `reference`.
///
/// Returns the annotated image together with one [`MarkOutcome`] per
/// answer-key entry, in input order. Unresolved entries produce an outcome
/// but no marker. `reference` is borrowed immutably, so a single decoded
/// reference image can serve concurrent calls.
#[cfg_attr(
    feature = "tracing",
    instrument(
        level = "info",
        skip(answer_key, index, reference, style),
        fields(entries = answer_key.len(), width = reference.width(), height = reference.height())
    )
)]
pub fn annotate(
    answer_key: &[AnswerKeyEntry],
    index: &CoordinateIndex,
    reference: &RgbImage,
    style: &MarkStyle,
) -> Result<(AnnotatedImage, Vec<MarkOutcome>), AnnotateError> {
    validate_answer_key(answer_key)?;
    style.validate()?;
    if reference.width() == 0 || reference.height() == 0 {
        return Err(ImageError::EmptyImage {
            width: reference.width(),
            height: reference.height(),
        }
        .into());
    }

    let outcomes = resolve_outcomes(answer_key, index);
    let markers: Vec<Marker> = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            MarkOutcome::Marked {
                question_id,
                answer_label,
                x,
                y,
            } => Some(Marker {
                question_id: question_id.clone(),
                answer_label: answer_label.clone(),
                center: Point2::new(*x, *y),
            }),
            MarkOutcome::Unresolved { .. } => None,
        })
        .collect();

    let image = composite(reference, &markers, style);
    info!(
        "marked {} of {} answers",
        count_marked(&outcomes),
        outcomes.len()
    );

    Ok((
        AnnotatedImage {
            image,
            markers,
            style: *style,
        },
        outcomes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use image::Rgb;
    use scantron_core::{CoordinateEntry, QuestionId};

    fn white(w: u32, h: u32) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb([255, 255, 255]))
    }

    fn two_option_index() -> CoordinateIndex {
        CoordinateIndex::build(&[
            CoordinateEntry::new(1, "A", 10.0, 20.0),
            CoordinateEntry::new(1, "B", 30.0, 20.0),
        ])
        .expect("index")
    }

    #[test]
    fn marks_resolved_entry() {
        let index = two_option_index();
        let reference = white(50, 50);
        let (annotated, outcomes) = annotate(
            &[AnswerKeyEntry::new(1, "A")],
            &index,
            &reference,
            &MarkStyle::default(),
        )
        .expect("annotate");

        assert_eq!(outcomes.len(), 1);
        let (x, y) = outcomes[0].position().expect("marked");
        assert_relative_eq!(x, 10.0);
        assert_relative_eq!(y, 20.0);
        assert_eq!(annotated.markers().len(), 1);
        assert_eq!((annotated.width(), annotated.height()), (50, 50));
        assert_eq!(annotated.style(), &MarkStyle::default());

        let image = annotated.into_image();
        assert!(image.get_pixel(10, 20).0[0] < 128);
        assert_eq!(image.get_pixel(30, 20).0[0], 255);
    }

    #[test]
    fn lowercase_label_without_coordinate_is_unresolved() {
        let index = CoordinateIndex::build(&[CoordinateEntry::new(1, "A", 10.0, 20.0)])
            .expect("index");
        let reference = white(50, 50);
        let (annotated, outcomes) = annotate(
            &[AnswerKeyEntry::new(1, "b")],
            &index,
            &reference,
            &MarkStyle::default(),
        )
        .expect("annotate");

        assert_eq!(
            outcomes,
            [MarkOutcome::Unresolved {
                question_id: QuestionId::Int(1),
                answer_label: "b".to_string(),
            }]
        );
        assert!(annotated.markers().is_empty());
        assert_eq!(annotated.image(), &reference);
    }

    #[test]
    fn keeps_input_order_with_mixed_outcomes() {
        let index = two_option_index();
        let reference = white(50, 50);
        let key = [AnswerKeyEntry::new(2, "C"), AnswerKeyEntry::new(1, "b")];
        let (annotated, outcomes) =
            annotate(&key, &index, &reference, &MarkStyle::default()).expect("annotate");

        assert_eq!(outcomes.len(), key.len());
        for (outcome, entry) in outcomes.iter().zip(&key) {
            assert_eq!(outcome.question_id(), &entry.question_id);
            assert_eq!(outcome.answer_label(), entry.answer_label);
        }
        assert!(!outcomes[0].is_marked());
        assert!(outcomes[1].is_marked());
        assert_eq!(annotated.markers().len(), 1);
        assert_eq!(annotated.markers()[0].center, Point2::new(30.0, 20.0));
    }

    #[test]
    fn empty_key_is_a_validation_error() {
        let err = annotate(&[], &two_option_index(), &white(10, 10), &MarkStyle::default())
            .unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Validation(ValidationError::EmptyAnswerKey)
        ));
    }

    #[test]
    fn blank_label_is_a_validation_error() {
        let err = annotate(
            &[AnswerKeyEntry::new(1, "A"), AnswerKeyEntry::new(2, "")],
            &two_option_index(),
            &white(10, 10),
            &MarkStyle::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Validation(ValidationError::EmptyAnswerLabel { position: 1, .. })
        ));
    }

    #[test]
    fn zero_sized_reference_is_an_image_error() {
        let err = annotate(
            &[AnswerKeyEntry::new(1, "A")],
            &two_option_index(),
            &RgbImage::new(0, 0),
            &MarkStyle::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            AnnotateError::Image(ImageError::EmptyImage { .. })
        ));
    }

    #[test]
    fn repeated_calls_are_identical_and_reference_is_untouched() {
        let index = two_option_index();
        let reference = white(50, 50);
        let key = [AnswerKeyEntry::new(1, "a"), AnswerKeyEntry::new(1, "B")];
        let style = MarkStyle::default();

        let (first_img, first_log) = annotate(&key, &index, &reference, &style).expect("first");
        let (second_img, second_log) = annotate(&key, &index, &reference, &style).expect("second");

        assert_eq!(first_log, second_log);
        assert_eq!(first_img.image(), second_img.image());
        assert_eq!(reference, white(50, 50));
    }
}
