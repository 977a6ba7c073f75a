use anyhow::{Context, Result};
use std::{fs, path::Path, thread, time::Duration};
use tracing::{info, warn};

use crate::{
    config::ScraperConfig,
    link_collector, review_page,
    types::{ReviewRecord, NOT_AVAILABLE},
};

pub const CSV_COLUMNS: [&str; 9] = [
    "review_id",
    "source_name",
    "source_url",
    "film_title",
    "review_date",
    "numerical_rating",
    "text_complete",
    "author",
    "cited_works_list",
];

/// Sequential driver for the two-stage pipeline: collect candidate links
/// once, scrape each page with a fixed politeness delay in between, then
/// write all kept records to CSV in one pass at the end.
pub struct ReviewScraper {
    client: reqwest::blocking::Client,
    config: ScraperConfig,
}

impl ReviewScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.scraping.user_agent)
            .timeout(Duration::from_secs(config.scraping.request_timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    /// Run the pipeline and return the number of records written. A `limit`
    /// takes a prefix of the (unordered) link collection, used to keep
    /// development runs small; `None` scrapes the full collection.
    pub fn run(&self, limit: Option<usize>) -> Result<usize> {
        info!("Starting review scraper");

        let mut links = link_collector::collect_review_links(&self.client, &self.config);
        info!("Found {} candidate review links", links.len());

        if let Some(limit) = limit {
            links.truncate(limit);
            info!("Limited to processing {} links", links.len());
        }

        let total = links.len();
        let mut results = Vec::new();
        for (i, link) in links.iter().enumerate() {
            info!("[{}/{}] scraping: {}", i + 1, total, link);

            match review_page::scrape_review_page(&self.client, link) {
                Some(record) if record.film_title.is_some() => results.push(record),
                Some(_) => warn!("Not saved (film title missing): {}", link),
                None => warn!("Not saved (page could not be scraped): {}", link),
            }

            // Politeness throttle between requests, success or not.
            thread::sleep(Duration::from_millis(self.config.scraping.delay_ms));
        }

        if results.is_empty() {
            warn!("No review data collected; no output written");
            return Ok(0);
        }

        write_csv(&results, Path::new(&self.config.output.csv_path))?;
        info!(
            "Saved {} reviews to {}",
            results.len(),
            self.config.output.csv_path
        );
        Ok(results.len())
    }
}

/// Write the kept records as CSV: header row then one row per record, in
/// the declared column order. Absent author/date serialize as the `N/A`
/// sentinel; absent rating/body serialize as empty fields.
pub fn write_csv(records: &[ReviewRecord], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {:?}", parent))?;
        }
    }

    let mut wtr = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create output file {:?}", path))?;

    wtr.write_record(&CSV_COLUMNS)?;

    for record in records {
        wtr.write_record(&[
            &record.review_id,
            &record.source_name,
            &record.source_url,
            &record.film_title.clone().unwrap_or_default(),
            &record
                .review_date
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            &record
                .numerical_rating
                .map(|rating| rating.to_string())
                .unwrap_or_default(),
            &record.text_complete.clone().unwrap_or_default(),
            &record
                .author
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            &record.cited_works_list,
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_record() -> ReviewRecord {
        let mut record = ReviewRecord::new("https://lwlies.com/reviews/blue-moon/");
        record.film_title = Some("Blue Moon".to_string());
        record.review_date = Some("21 Aug 2025".to_string());
        record.numerical_rating = Some(3.67);
        record.text_complete = Some("A long enough body of review text.".to_string());
        record.author = Some("Jane Doe".to_string());
        record.cited_works_list = "Amadeus, Before Sunrise".to_string();
        record
    }

    #[test]
    fn test_write_csv_columns_and_sentinels() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("reviews.csv");

        let mut missing = ReviewRecord::new("https://lwlies.com/reviews/bugonia/");
        missing.film_title = Some("Bugonia".to_string());

        write_csv(&[sample_record(), missing], &path)?;

        let mut rdr = csv::Reader::from_path(&path)?;
        assert_eq!(
            rdr.headers()?.iter().collect::<Vec<_>>(),
            CSV_COLUMNS.to_vec()
        );

        let rows: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>()?;
        assert_eq!(rows.len(), 2);

        assert_eq!(&rows[0][3], "Blue Moon");
        assert_eq!(&rows[0][5], "3.67");
        assert_eq!(&rows[0][8], "Amadeus, Before Sunrise");

        // Missing author/date fall back to the sentinel; rating and body
        // stay empty.
        assert_eq!(&rows[1][3], "Bugonia");
        assert_eq!(&rows[1][4], "N/A");
        assert_eq!(&rows[1][5], "");
        assert_eq!(&rows[1][6], "");
        assert_eq!(&rows[1][7], "N/A");
        Ok(())
    }

    #[test]
    fn test_write_csv_creates_parent_directory() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data").join("raw").join("reviews.csv");

        write_csv(&[sample_record()], &path)?;
        assert!(path.exists());
        Ok(())
    }
}
