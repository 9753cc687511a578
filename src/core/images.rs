//! Bounded image list gated by a format check and a single load probe.

use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::config::WizardConfig;
use crate::domain::ImageRef;
use crate::errors::{ValidationError, ValidationKind};

static IMAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^https?://[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?)*(?::\d{1,5})?(?:/[^\s?#]*)?(?:\?[^\s#]*)?(?:#\S*)?$",
    )
    .expect("image url pattern is valid")
});

/// Conservative URL shape check: protocol, host, optional path and query.
pub fn is_valid_image_url(url: &str) -> bool {
    IMAGE_URL.is_match(url.trim())
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProbeFailure(pub String);

/// Environment primitive that tries to decode a URL as an image.
#[async_trait]
pub trait ImageProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<(), ProbeFailure>;
}

/// Reservation of the validating slot, handed back to [`ImageValidationPipeline::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProbe {
    url: String,
    generation: u64,
}

impl PendingProbe {
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeResolution {
    Committed,
    /// The pipeline was reset while probing; nothing was written.
    Discarded,
}

pub struct ImageValidationPipeline {
    images: Vec<ImageRef>,
    validating: Option<String>,
    generation: u64,
    max_images: usize,
    min_images: usize,
    probe: Option<Arc<dyn ImageProbe>>,
}

impl std::fmt::Debug for ImageValidationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageValidationPipeline")
            .field("images", &self.images)
            .field("validating", &self.validating)
            .field("generation", &self.generation)
            .field("probing", &self.probe.is_some())
            .finish()
    }
}

impl ImageValidationPipeline {
    pub fn new(config: &WizardConfig, probe: Option<Arc<dyn ImageProbe>>) -> Self {
        Self {
            images: Vec::new(),
            validating: None,
            generation: 0,
            max_images: config.max_images,
            min_images: config.min_images,
            probe: if config.probe_images { probe } else { None },
        }
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    /// URL currently being probed, if any.
    pub fn validating(&self) -> Option<&str> {
        self.validating.as_deref()
    }

    pub fn validated_count(&self) -> usize {
        self.images.iter().filter(|image| image.validated).count()
    }

    pub fn validated_urls(&self) -> Vec<String> {
        self.images
            .iter()
            .filter(|image| image.validated)
            .map(|image| image.url.clone())
            .collect()
    }

    pub fn is_submittable(&self) -> bool {
        self.validated_count() >= self.min_images
    }

    pub fn min_images(&self) -> usize {
        self.min_images
    }

    pub fn max_images(&self) -> usize {
        self.max_images
    }

    /// Runs the synchronous checks and reserves the validating slot.
    pub fn begin_candidate(&mut self, url: &str) -> Result<PendingProbe, ValidationError> {
        let url = url.trim();
        if !is_valid_image_url(url) {
            return Err(ValidationError::for_field(
                ValidationKind::InvalidFormat,
                "images",
                "Enter a valid image URL (http or https)",
            ));
        }
        if self.validating.is_some() {
            return Err(ValidationError::for_field(
                ValidationKind::ProbeInProgress,
                "images",
                "Wait for the current image to finish validating",
            ));
        }
        if self.images.len() >= self.max_images {
            return Err(ValidationError::for_field(
                ValidationKind::LimitReached,
                "images",
                format!("You can add at most {} images", self.max_images),
            ));
        }
        self.validating = Some(url.to_string());
        tracing::debug!(url, "image probe started");
        Ok(PendingProbe {
            url: url.to_string(),
            generation: self.generation,
        })
    }

    /// Applies a probe outcome. Tickets from before a [`reset`](Self::reset) are dropped.
    pub fn resolve(
        &mut self,
        pending: PendingProbe,
        outcome: Result<(), ProbeFailure>,
    ) -> Result<ProbeResolution, ValidationError> {
        if pending.generation != self.generation {
            tracing::debug!(url = %pending.url, "stale image probe discarded");
            return Ok(ProbeResolution::Discarded);
        }
        self.validating = None;
        match outcome {
            Ok(()) => {
                tracing::debug!(url = %pending.url, "image accepted");
                self.images.push(ImageRef::validated(pending.url));
                Ok(ProbeResolution::Committed)
            }
            Err(failure) => {
                tracing::debug!(url = %pending.url, reason = %failure, "image rejected");
                Err(ValidationError::for_field(
                    ValidationKind::LoadFailed,
                    "images",
                    format!("Could not load image: {failure}"),
                ))
            }
        }
    }

    /// Validates and commits one candidate. Without a probe the format check
    /// alone decides.
    pub async fn submit_candidate(
        &mut self,
        url: &str,
    ) -> Result<ProbeResolution, ValidationError> {
        let pending = self.begin_candidate(url)?;
        let outcome = match self.probe.clone() {
            Some(probe) => probe.probe(pending.url()).await,
            None => Ok(()),
        };
        self.resolve(pending, outcome)
    }

    /// Removes the first image with `url`.
    pub fn remove_image(&mut self, url: &str) -> bool {
        let url = url.trim();
        match self.images.iter().position(|image| image.url == url) {
            Some(index) => {
                self.images.remove(index);
                true
            }
            None => false,
        }
    }

    /// Drops any in-flight probe so its eventual result is ignored.
    pub fn reset(&mut self) {
        self.validating = None;
        self.generation += 1;
    }

    /// Loads persisted URLs. Returns how many were over the limit and dropped.
    pub fn hydrate(&mut self, urls: &[String], validated: bool) -> usize {
        self.reset();
        self.images = urls
            .iter()
            .take(self.max_images)
            .map(|url| {
                if validated {
                    ImageRef::validated(url.as_str())
                } else {
                    ImageRef::pending(url.as_str())
                }
            })
            .collect();
        urls.len().saturating_sub(self.max_images)
    }

    /// Probes images loaded as pending; failures are removed and returned.
    pub async fn revalidate_pending(&mut self) -> Vec<String> {
        let pending: Vec<String> = self
            .images
            .iter()
            .filter(|image| !image.validated)
            .map(|image| image.url.clone())
            .collect();

        let mut failed = Vec::new();
        for url in pending {
            let outcome = match self.probe.clone() {
                Some(probe) => probe.probe(&url).await,
                None => Ok(()),
            };
            match outcome {
                Ok(()) => {
                    if let Some(image) = self.images.iter_mut().find(|image| image.url == url) {
                        image.validated = true;
                    }
                }
                Err(failure) => {
                    tracing::warn!(url = %url, reason = %failure, "persisted image failed to load");
                    self.images.retain(|image| image.url != url);
                    failed.push(url);
                }
            }
        }
        failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct RejectBroken;

    #[async_trait]
    impl ImageProbe for RejectBroken {
        async fn probe(&self, url: &str) -> Result<(), ProbeFailure> {
            if url.contains("broken") {
                Err(ProbeFailure("decode error".into()))
            } else {
                Ok(())
            }
        }
    }

    fn pipeline() -> ImageValidationPipeline {
        ImageValidationPipeline::new(&WizardConfig::default(), Some(Arc::new(RejectBroken)))
    }

    fn url(n: usize) -> String {
        format!("https://cdn.example.com/photos/{n}.jpg")
    }

    #[test]
    fn url_shape_check() {
        assert!(is_valid_image_url("https://cdn.example.com/a.jpg?w=400"));
        assert!(is_valid_image_url("http://localhost:8080/img"));
        assert!(!is_valid_image_url("cdn.example.com/a.jpg"));
        assert!(!is_valid_image_url("ftp://cdn.example.com/a.jpg"));
        assert!(!is_valid_image_url("https://"));
        assert!(!is_valid_image_url("https://bad host/a.jpg"));
    }

    #[tokio::test]
    async fn invalid_format_is_rejected_before_probing() {
        let mut pipeline = pipeline();
        let err = pipeline.submit_candidate("not a url").await.expect_err("format");
        assert_eq!(err.kind, ValidationKind::InvalidFormat);
        assert!(pipeline.validating().is_none());
    }

    #[test]
    fn only_one_probe_may_be_outstanding() {
        let mut pipeline = pipeline();
        let first = pipeline.begin_candidate(&url(1)).expect("first probe");
        let err = pipeline.begin_candidate(&url(2)).expect_err("second probe");
        assert_eq!(err.kind, ValidationKind::ProbeInProgress);
        assert_eq!(pipeline.validating(), Some(url(1).as_str()));

        pipeline.resolve(first, Ok(())).expect("resolve");
        assert!(pipeline.validating().is_none());
        assert_eq!(pipeline.validated_urls(), vec![url(1)]);
    }

    #[tokio::test]
    async fn failed_probe_discards_candidate() {
        let mut pipeline = pipeline();
        let err = pipeline
            .submit_candidate("https://cdn.example.com/broken.png")
            .await
            .expect_err("load failure");
        assert_eq!(err.kind, ValidationKind::LoadFailed);
        assert!(pipeline.images().is_empty());
        assert!(pipeline.validating().is_none());
    }

    #[tokio::test]
    async fn limit_is_enforced_and_threshold_tracked() {
        let mut pipeline = pipeline();
        for n in 0..5 {
            assert_eq!(pipeline.is_submittable(), n >= 3, "after {n} images");
            pipeline.submit_candidate(&url(n)).await.expect("accepted");
        }
        assert!(pipeline.is_submittable());
        let err = pipeline.submit_candidate(&url(6)).await.expect_err("limit");
        assert_eq!(err.kind, ValidationKind::LimitReached);

        assert!(pipeline.remove_image(&url(0)));
        assert!(!pipeline.remove_image(&url(0)));
        pipeline.submit_candidate(&url(6)).await.expect("room again");
        assert_eq!(pipeline.validated_urls().last(), Some(&url(6)));
    }

    #[test]
    fn reset_discards_late_resolution() {
        let mut pipeline = pipeline();
        let pending = pipeline.begin_candidate(&url(1)).expect("probe");
        pipeline.reset();
        let resolution = pipeline.resolve(pending, Ok(())).expect("stale");
        assert_eq!(resolution, ProbeResolution::Discarded);
        assert!(pipeline.images().is_empty());
    }

    #[tokio::test]
    async fn format_only_when_probing_disabled() {
        let config = WizardConfig {
            probe_images: false,
            ..WizardConfig::default()
        };
        let mut pipeline = ImageValidationPipeline::new(&config, Some(Arc::new(RejectBroken)));
        pipeline
            .submit_candidate("https://cdn.example.com/broken.png")
            .await
            .expect("accepted without decode");
        assert_eq!(pipeline.validated_count(), 1);
    }

    #[tokio::test]
    async fn pending_images_do_not_count_until_revalidated() {
        let mut pipeline = pipeline();
        let urls = vec![url(1), url(2), "https://cdn.example.com/broken.jpg".to_string(), url(3)];
        assert_eq!(pipeline.hydrate(&urls, false), 0);
        assert!(!pipeline.is_submittable());

        let failed = pipeline.revalidate_pending().await;
        assert_eq!(failed, vec!["https://cdn.example.com/broken.jpg".to_string()]);
        assert_eq!(pipeline.validated_urls(), vec![url(1), url(2), url(3)]);
        assert!(pipeline.is_submittable());
    }
}
