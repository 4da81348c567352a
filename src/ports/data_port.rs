//! Market data access port trait.

use crate::domain::error::PairtraderError;
use crate::domain::series::ClosePoint;
use chrono::NaiveDate;

pub trait DataPort {
    /// Daily close prices for one symbol over the window, sorted by date.
    fn fetch_closes(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<ClosePoint>, PairtraderError>;

    fn list_symbols(&self) -> Result<Vec<String>, PairtraderError>;

    fn get_data_range(
        &self,
        symbol: &str,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, PairtraderError>;
}
