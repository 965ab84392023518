use std::path::Path;

use anyhow::Result;
use raylib::prelude::Rectangle;
use tracing::warn;

use crate::fit::FocusPoint;

/// Supplies a best-effort point of interest for an image, in source pixels.
pub trait FocusProvider {
    fn locate_focus(&mut self, path: &Path) -> Result<Option<FocusPoint>>;
}

/// Center-crop everything.
pub struct NoFocus;

impl FocusProvider for NoFocus {
    fn locate_focus(&mut self, _path: &Path) -> Result<Option<FocusPoint>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Detection {
    pub bounds: Rectangle,
    pub confidence: f32,
}

/// Mean of the detection centres, `None` when nothing was detected.
pub fn mean_center(detections: &[Detection]) -> Option<FocusPoint> {
    if detections.is_empty() {
        return None;
    }
    let n = detections.len() as f32;
    let (sx, sy) = detections.iter().fold((0.0, 0.0), |(sx, sy), d| {
        (sx + d.bounds.x + d.bounds.width / 2.0, sy + d.bounds.y + d.bounds.height / 2.0)
    });
    Some(FocusPoint::new(sx / n, sy / n))
}

/// Picks the focus provider for this run.
pub fn focus_provider(enabled: bool, model_file: &Path) -> Box<dyn FocusProvider> {
    if !enabled {
        return Box::new(NoFocus);
    }

    #[cfg(feature = "subject-detection")]
    {
        match SubjectDetector::new(model_file, vec![0]) {
            Ok(detector) => return Box::new(detector),
            Err(e) => warn!("subject detection unavailable, using center crop: {e:#}"),
        }
    }
    #[cfg(not(feature = "subject-detection"))]
    warn!(
        model = %model_file.display(),
        "focus detection requested but this build lacks the `subject-detection` feature, using center crop"
    );

    Box::new(NoFocus)
}

#[cfg(feature = "subject-detection")]
pub use detector::SubjectDetector;

#[cfg(feature = "subject-detection")]
mod detector {
    use std::path::Path;

    use anyhow::{Context, Result};
    use raylib::prelude::Rectangle;
    use tracing::trace;
    use usls::{DType, DataLoader, Device, Options, Scale, Task, models::YOLO};

    use super::{Detection, FocusProvider, mean_center};
    use crate::fit::FocusPoint;

    /// YOLO head/face detector.
    pub struct SubjectDetector {
        model: YOLO,
        filter_classes: Vec<usize>,
    }

    impl SubjectDetector {
        pub fn new(model_file: &Path, filter_classes: Vec<usize>) -> Result<Self> {
            let model_file = model_file
                .to_str()
                .with_context(|| format!("model path {} is not valid UTF-8", model_file.display()))?;
            let options = Options::yolo()
                .with_model_file(model_file)
                .with_model_task(Task::ObjectDetection)
                .with_model_version(8.into())
                .with_model_scale(Scale::S)
                .with_model_dtype(DType::Fp16)
                .with_model_device(Device::Auto(0))
                .with_trt_fp16(true)
                .with_model_ixx(0, 0, (1, 1, 4).into())
                .with_model_ixx(0, 2, (224, 640, 1280).into())
                .with_model_ixx(0, 3, (224, 640, 1280).into())
                .with_class_confs(&[0.2, 0.15])
                .with_keypoint_confs(&[0.5])
                .with_topk(5)
                .retain_classes(&filter_classes)
                .exclude_classes(&[]);

            let model = YOLO::try_from(options.commit()?)?;
            Ok(Self { model, filter_classes })
        }

        pub fn detect(&mut self, image_path: &Path) -> Result<Vec<Detection>> {
            let source = image_path
                .to_str()
                .with_context(|| format!("image path {} is not valid UTF-8", image_path.display()))?;
            let dl = DataLoader::new(source)?.with_batch(self.model.batch() as _).build()?;

            let mut detections = Vec::new();
            for xs in &dl {
                let ys = self.model.forward(&xs)?;
                for y in ys.iter() {
                    let Some(hbbs) = &y.hbbs() else { continue };
                    for hbb in hbbs.iter() {
                        let meta = hbb.meta();
                        let (Some(id), Some(confidence)) = (meta.id(), meta.confidence()) else {
                            continue;
                        };
                        if self.filter_classes.contains(&id) {
                            detections.push(Detection {
                                bounds: Rectangle::new(hbb.x(), hbb.y(), hbb.xmax() - hbb.x(), hbb.ymax() - hbb.y()),
                                confidence,
                            });
                        }
                    }
                }
            }
            trace!(count = detections.len(), path = %image_path.display(), "subjects detected");
            Ok(detections)
        }
    }

    impl FocusProvider for SubjectDetector {
        fn locate_focus(&mut self, path: &Path) -> Result<Option<FocusPoint>> {
            Ok(mean_center(&self.detect(path)?))
        }
    }
}
