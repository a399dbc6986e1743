use crate::errors::Result;
use crate::io::{
    LcaWriter,
    PeptideReader,
};
use crate::models::PeptideRecord;
use crate::remote::{
    ResolveOptions,
    Resolver,
    Sleeper,
    ThreadSleeper,
    TaxonomyService,
};
use indicatif::ProgressBar;
use std::collections::HashSet;
use std::io::{
    Read,
    Write,
};
use std::time::{
    Duration,
    Instant,
};
use tracing::{
    debug,
    info,
    instrument,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatchOptions {
    /// Peptide rows per shard.
    pub batch_size: usize,
    /// Pause after this many shards, 0 never pauses.
    pub pause_every: usize,
    pub pause: Duration,
    pub resolve: ResolveOptions,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            batch_size: 100,
            pause_every: 5,
            pause: Duration::from_secs(10),
            resolve: ResolveOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub records: usize,
    pub shards: usize,
    /// Sum over shards of the distinct sequences sent to the service.
    pub unique_sequences: usize,
    pub unresolved_records: usize,
}

/// Drives a peptide file through the [`Resolver`] shard by shard, writing
/// the merged LCA table as it goes.
pub struct Dispatcher<S, Z = ThreadSleeper> {
    resolver: Resolver<S, Z>,
    options: DispatchOptions,
    progress: ProgressBar,
}

impl<S: TaxonomyService, Z: Sleeper> Dispatcher<S, Z> {
    pub fn new(resolver: Resolver<S, Z>, options: DispatchOptions) -> Self {
        Self {
            resolver,
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports processed rows on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn resolver(&self) -> &Resolver<S, Z> {
        &self.resolver
    }

    /// Reads peptide rows from `input` and writes the LCA table to `output`.
    ///
    /// Every shard is flushed before the next one is requested, so when the
    /// service fails for good the rows of the earlier shards are on disk.
    #[instrument(skip_all)]
    pub fn run<R: Read, W: Write>(&mut self, input: R, output: W) -> Result<DispatchSummary> {
        let start = Instant::now();
        let batch_size = self.options.batch_size.max(1);
        let mut reader = PeptideReader::new(input)?;
        let mut writer = LcaWriter::new(output, reader.header())?;
        writer.flush()?;

        let mut summary = DispatchSummary::default();
        let mut shard: Vec<PeptideRecord> = Vec::with_capacity(batch_size);
        for record in reader.records() {
            shard.push(record?);
            if shard.len() == batch_size {
                self.dispatch_shard(&shard, &mut writer, &mut summary)?;
                shard.clear();
            }
        }
        if !shard.is_empty() {
            self.dispatch_shard(&shard, &mut writer, &mut summary)?;
        }

        self.progress.finish();
        info!(
            "Wrote {} rows in {} shards ({} unresolved) in {:?}",
            summary.records,
            summary.shards,
            summary.unresolved_records,
            start.elapsed()
        );
        Ok(summary)
    }

    fn dispatch_shard<W: Write>(
        &mut self,
        shard: &[PeptideRecord],
        writer: &mut LcaWriter<W>,
        summary: &mut DispatchSummary,
    ) -> Result<()> {
        let pause_every = self.options.pause_every;
        if pause_every > 0 && summary.shards > 0 && summary.shards % pause_every == 0 {
            debug!("Pausing {:?} after {} shards", self.options.pause, summary.shards);
            self.resolver.sleeper().sleep(self.options.pause);
        }

        let mut seen = HashSet::with_capacity(shard.len());
        let unique: Vec<String> = shard
            .iter()
            .map(|record| record.sequence())
            .filter(|sequence| !sequence.is_empty() && seen.insert(*sequence))
            .map(|sequence| sequence.to_string())
            .collect();

        let resolved = self.resolver.resolve(&unique, self.options.resolve)?;

        let mut unresolved = 0;
        for record in shard {
            let lineage = resolved.get(record.sequence());
            if lineage.is_none() {
                unresolved += 1;
            }
            writer.write_row(record, lineage)?;
        }
        writer.flush()?;

        summary.shards += 1;
        summary.records += shard.len();
        summary.unique_sequences += unique.len();
        summary.unresolved_records += unresolved;
        self.progress.inc(shard.len() as u64);
        info!(
            "Shard {}: {} rows, {} distinct sequences, {} unresolved",
            summary.shards,
            shard.len(),
            unique.len(),
            unresolved
        );
        Ok(())
    }
}
