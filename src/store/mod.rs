//! Workbook stores
//!
//! A store loads and saves one whole workbook. Handlers receive a store
//! instead of touching files directly, so the local file, the remote
//! spreadsheet service and test doubles are interchangeable.

mod fallback;
mod remote;
pub mod xlsx;

pub use fallback::FallbackStore;
pub use remote::{AccessToken, RemoteStore, SHEETS_API_BASE};
pub use xlsx::XlsxStore;

use crate::error::DashboardResult;
use crate::loader::append_row;
use crate::workbook::{CellValue, Workbook};
use async_trait::async_trait;

/// Which backing resource served a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Primary,
    Fallback,
}

#[async_trait]
pub trait SheetStore: Send + Sync {
    /// Human-readable name of the backing resource, for logs.
    fn describe(&self) -> String;

    async fn load(&self) -> DashboardResult<Workbook>;

    async fn save(&self, workbook: &Workbook) -> DashboardResult<()>;

    /// Load and report where the workbook came from. Single-resource stores
    /// always answer [`Source::Primary`].
    async fn load_tracked(&self) -> DashboardResult<(Workbook, Source)> {
        Ok((self.load().await?, Source::Primary))
    }

    /// Save back to the resource a [`SheetStore::load_tracked`] reported.
    async fn save_to(&self, _source: Source, workbook: &Workbook) -> DashboardResult<()> {
        self.save(workbook).await
    }
}

/// Load, apply `f`, save to the resource the load came from. Nothing is
/// saved when `f` fails.
///
/// No locking: two callers interleaving on the same resource can lose one
/// update. Callers that share a process serialize through their own lock.
pub async fn update<S, T, F>(store: &S, f: F) -> DashboardResult<T>
where
    S: SheetStore + ?Sized,
    F: FnOnce(&mut Workbook) -> DashboardResult<T> + Send,
    T: Send,
{
    let (mut workbook, source) = store.load_tracked().await?;
    let result = f(&mut workbook)?;
    store.save_to(source, &workbook).await?;
    Ok(result)
}

/// Append one row to an existing sheet and persist the whole workbook.
pub async fn append_and_save<S: SheetStore + ?Sized>(
    store: &S,
    sheet_name: &str,
    row: Vec<CellValue>,
) -> DashboardResult<()> {
    update(store, |workbook| append_row(workbook, sheet_name, row)).await
}
