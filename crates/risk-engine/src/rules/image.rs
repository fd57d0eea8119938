// Image rules: resolution, recompression, and blur flags
use shared_types::{Reason, ReasonCode};

use crate::image::ImageSummary;

const W_LOW_RES: f64 = 0.10;
const W_OVERCOMPRESSED: f64 = 0.05;
const W_BLURRY: f64 = 0.08;

/// Evaluate all image rules over the summary of the page image set. A
/// withheld blur signal (`blurry: None`) never emits anything.
pub fn check_images(summary: &ImageSummary) -> Vec<Reason> {
    let mut reasons = Vec::new();

    if summary.low_res {
        reasons.push(Reason::new(
            ReasonCode::ImageLowRes,
            "Page resolution is very low",
            W_LOW_RES,
        ));
    }

    if summary.overcompressed {
        reasons.push(Reason::new(
            ReasonCode::ImageOvercompressed,
            "JPEG page with aggressive compression",
            W_OVERCOMPRESSED,
        ));
    }

    if summary.blurry == Some(true) {
        reasons.push(Reason::new(
            ReasonCode::ImageBlurry,
            "Blurry page (low sharpness)",
            W_BLURRY,
        ));
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_summary_emits_nothing() {
        let reasons = check_images(&ImageSummary::default());
        assert!(reasons.is_empty());
    }

    #[test]
    fn each_flag_maps_to_one_reason() {
        let summary = ImageSummary {
            min_area_px: Some(100 * 100),
            low_res: true,
            overcompressed: true,
            blurry: Some(true),
        };
        let codes: Vec<_> = check_images(&summary).iter().map(|r| r.code).collect();
        assert_eq!(
            codes,
            vec![
                ReasonCode::ImageLowRes,
                ReasonCode::ImageOvercompressed,
                ReasonCode::ImageBlurry
            ]
        );
    }

    #[test]
    fn withheld_blur_signal_is_not_a_reason() {
        let summary = ImageSummary {
            blurry: None,
            ..ImageSummary::default()
        };
        assert!(check_images(&summary).is_empty());
    }
}
