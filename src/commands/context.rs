use anyhow::Result;
use chrono::NaiveDate;

use super::{current_profile, today_or};
use crate::{collab::ContextBundle, store::Store};

/// Always JSON: this is what an advisor receives.
pub async fn handle(store: &Store, date: Option<NaiveDate>) -> Result<()> {
    let profile = current_profile(store).await?;
    let bundle = ContextBundle::gather(store, &profile, today_or(date)).await?;
    println!("{}", bundle.to_json()?);
    Ok(())
}
