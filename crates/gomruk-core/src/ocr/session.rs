//! Scoped ownership of a recognition worker for one extraction run.

use image::DynamicImage;
use tracing::{debug, info};

use super::{
    AssetLocation, ImagePreprocessor, RecognitionProgress, RecognitionWorker, RecognizedText,
    WorkerFactory,
};
use crate::error::OcrError;

/// A recognition worker acquired for the duration of one run.
///
/// The worker is created once and released exactly once: either through
/// [`RecognitionSession::finish`] or, on any early exit, when the session is
/// dropped.
pub struct RecognitionSession<W: RecognitionWorker> {
    worker: Option<W>,
    preprocessor: ImagePreprocessor,
}

impl<W: RecognitionWorker> RecognitionSession<W> {
    /// Start a worker for `alphabet` with language data from `assets`.
    pub fn start<F>(factory: &F, alphabet: &str, assets: &AssetLocation) -> Result<Self, OcrError>
    where
        F: WorkerFactory<Worker = W>,
    {
        info!("Starting recognition worker ({}) from {}", alphabet, assets);
        let worker = factory.create(alphabet, assets)?;

        Ok(Self {
            worker: Some(worker),
            preprocessor: ImagePreprocessor::new(),
        })
    }

    /// Set the preprocessor applied to every raster.
    pub fn with_preprocessor(mut self, preprocessor: ImagePreprocessor) -> Self {
        self.preprocessor = preprocessor;
        self
    }

    /// Recognize one page, reporting progress as it goes.
    ///
    /// Progress starts at 0 and ends at 100 for a successful page, and never
    /// decreases in between.
    pub fn recognize_page(
        &mut self,
        page: u32,
        raster: &DynamicImage,
        on_progress: &mut dyn FnMut(RecognitionProgress),
    ) -> Result<RecognizedText, OcrError> {
        let worker = self.worker.as_mut().ok_or(OcrError::Terminated)?;
        let prepared = self.preprocessor.prepare(raster)?;

        let mut last = 0u8;
        on_progress(RecognitionProgress { page, percent: 0 });

        let result = {
            let mut forward = |fraction: f32| {
                let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
                // Engine callbacks may repeat or regress; only report forward motion.
                if percent > last && percent < 100 {
                    last = percent;
                    on_progress(RecognitionProgress { page, percent });
                }
            };
            worker.recognize(&prepared, &mut forward)?
        };

        on_progress(RecognitionProgress { page, percent: 100 });
        debug!(
            "Page {} recognized: {} boxes, confidence {:.2}, {}ms",
            page,
            result.boxes.len(),
            result.confidence,
            result.processing_time_ms
        );

        Ok(result)
    }

    /// Release the worker now.
    pub fn finish(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(mut worker) = self.worker.take() {
            worker.terminate();
            info!("Recognition worker terminated");
        }
    }
}

impl<W: RecognitionWorker> Drop for RecognitionSession<W> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    struct StepWorker {
        steps: Vec<f32>,
        terminated: Rc<Cell<u32>>,
    }

    impl RecognitionWorker for StepWorker {
        fn recognize(
            &mut self,
            _raster: &DynamicImage,
            progress: &mut dyn FnMut(f32),
        ) -> Result<RecognizedText, OcrError> {
            for step in &self.steps {
                progress(*step);
            }
            Ok(RecognizedText::default())
        }

        fn terminate(&mut self) {
            self.terminated.set(self.terminated.get() + 1);
        }
    }

    struct StepFactory {
        steps: Vec<f32>,
        terminated: Rc<Cell<u32>>,
    }

    impl WorkerFactory for StepFactory {
        type Worker = StepWorker;

        fn create(&self, _alphabet: &str, _assets: &AssetLocation) -> Result<StepWorker, OcrError> {
            Ok(StepWorker {
                steps: self.steps.clone(),
                terminated: self.terminated.clone(),
            })
        }
    }

    fn factory(steps: Vec<f32>) -> (StepFactory, Rc<Cell<u32>>) {
        let terminated = Rc::new(Cell::new(0));
        (
            StepFactory {
                steps,
                terminated: terminated.clone(),
            },
            terminated,
        )
    }

    #[test]
    fn test_progress_is_monotonic() {
        let (factory, _) = factory(vec![0.3, 0.2, 0.3, 0.75, 1.4]);
        let assets = AssetLocation::Local("models".into());
        let mut session = RecognitionSession::start(&factory, "latin", &assets).unwrap();

        let mut seen = Vec::new();
        session
            .recognize_page(2, &DynamicImage::new_luma8(10, 10), &mut |p| seen.push(p.percent))
            .unwrap();

        assert_eq!(seen, vec![0, 30, 75, 100]);
    }

    #[test]
    fn test_finish_terminates_once() {
        let (factory, terminated) = factory(vec![]);
        let assets = AssetLocation::Local("models".into());
        let session = RecognitionSession::start(&factory, "latin", &assets).unwrap();

        session.finish();
        assert_eq!(terminated.get(), 1);
    }

    #[test]
    fn test_drop_terminates_once() {
        let (factory, terminated) = factory(vec![]);
        let assets = AssetLocation::Local("models".into());
        {
            let _session = RecognitionSession::start(&factory, "latin", &assets).unwrap();
        }
        assert_eq!(terminated.get(), 1);
    }
}
