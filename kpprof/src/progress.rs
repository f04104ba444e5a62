use indicatif::{ProgressBar, ProgressStyle};

/// Returns a progress bar for a stage of `total` stations.
pub fn make_progress_bar(prefix: &str, total: u64) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(total);
    pb.set_prefix(prefix.to_owned());
    pb.set_style(ProgressStyle::with_template("{prefix}...\n[{wide_bar:.cyan/blue}] {pos}/{len}")?.progress_chars("#>-"));
    Ok(pb)
}
