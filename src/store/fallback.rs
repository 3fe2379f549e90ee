//! Primary store with a fallback used when the primary resource is missing.

use super::{SheetStore, Source};
use crate::error::DashboardResult;
use crate::workbook::Workbook;
use async_trait::async_trait;
use tracing::{info, warn};

/// Writes go where the workbook was read from; `update` carries that
/// [`Source`] from its load to its save. A bare [`SheetStore::save`] writes
/// the primary.
pub struct FallbackStore {
    primary: Box<dyn SheetStore>,
    fallback: Box<dyn SheetStore>,
}

impl FallbackStore {
    pub fn new(primary: Box<dyn SheetStore>, fallback: Box<dyn SheetStore>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl SheetStore for FallbackStore {
    fn describe(&self) -> String {
        format!(
            "{} (fallback: {})",
            self.primary.describe(),
            self.fallback.describe()
        )
    }

    async fn load(&self) -> DashboardResult<Workbook> {
        let (workbook, _) = self.load_tracked().await?;
        Ok(workbook)
    }

    async fn save(&self, workbook: &Workbook) -> DashboardResult<()> {
        self.primary.save(workbook).await
    }

    async fn load_tracked(&self) -> DashboardResult<(Workbook, Source)> {
        match self.primary.load().await {
            Ok(workbook) => Ok((workbook, Source::Primary)),
            Err(e) if e.is_not_found() => {
                info!(
                    "{} not available ({}), falling back to {}",
                    self.primary.describe(),
                    e,
                    self.fallback.describe()
                );
                let workbook = self.fallback.load().await?;
                Ok((workbook, Source::Fallback))
            }
            Err(e) => {
                warn!("Error reading {}: {}", self.primary.describe(), e);
                Err(e)
            }
        }
    }

    async fn save_to(&self, source: Source, workbook: &Workbook) -> DashboardResult<()> {
        match source {
            Source::Primary => self.primary.save(workbook).await,
            Source::Fallback => self.fallback.save(workbook).await,
        }
    }
}
