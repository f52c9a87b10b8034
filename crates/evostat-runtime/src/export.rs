//! CSV export of aggregated series, alignments and correlations.
//!
//! Every table starts with the identity columns `elitism, algorithm,
//! use features, use hyperparameters, algorithm index`, where `algorithm`
//! is the family name. Display labels belong to the renderers. Absent values
//! are written as `NaN`.

use csv::Writer;
use evostat_core::error::Result;
use evostat_core::metadata::{AlgorithmIdentity, MetadataResolver};
use evostat_core::schema::Metric;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::aggregate::GroupedSeries;
use crate::alignment::AlignmentIndex;
use crate::correlation::CorrelationRecord;
use crate::pipeline::LogReport;

const IDENTITY_COLUMNS: [&str; 5] = [
    "elitism",
    "algorithm",
    "use features",
    "use hyperparameters",
    "algorithm index",
];

/// Format an optional value, using `NaN` for absent ones.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "NaN".to_string(),
    }
}

fn identity_fields(identity: &AlgorithmIdentity, algorithm_index: u8) -> Vec<String> {
    vec![
        identity.elitism.name().to_string(),
        identity.family.clone(),
        identity.use_features.to_string(),
        identity.use_hyperparameters.to_string(),
        algorithm_index.to_string(),
    ]
}

/// Write one row per (group, time value) with every metric's mean and std.
pub fn write_series<W: Write>(
    out: W,
    series: &GroupedSeries,
    resolver: &MetadataResolver,
) -> Result<()> {
    let mut writer = Writer::from_writer(out);

    let mut header: Vec<String> = IDENTITY_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.push(series.axis.name().to_string());
    for metric in Metric::ALL {
        header.push(format!("{} mean", metric.name()));
        header.push(format!("{} std", metric.name()));
    }
    writer.write_record(&header)?;

    for (key, points) in series.groups() {
        let identity = resolver.resolve(key.algorithm_index as usize)?;
        let fields = identity_fields(identity, key.algorithm_index);
        for point in points {
            let mut row = fields.clone();
            row.push(point.time.to_string());
            for metric in Metric::ALL {
                let summary = point.get(metric);
                row.push(format_value(summary.map(|s| s.mean)));
                row.push(format_value(summary.map(|s| s.std)));
            }
            writer.write_record(&row)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Write the canonical index of every group.
pub fn write_alignment<W: Write>(
    out: W,
    alignment: &AlignmentIndex,
    resolver: &MetadataResolver,
) -> Result<()> {
    let mut writer = Writer::from_writer(out);

    let mut header: Vec<&str> = IDENTITY_COLUMNS.to_vec();
    header.push("canonical index");
    writer.write_record(&header)?;

    for (key, canonical) in alignment.iter() {
        let identity = resolver.resolve(key.algorithm_index as usize)?;
        let mut row = identity_fields(identity, key.algorithm_index);
        row.push(canonical.to_string());
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write one row per correlation record.
pub fn write_correlations<W: Write>(out: W, records: &[CorrelationRecord]) -> Result<()> {
    let mut writer = Writer::from_writer(out);

    let mut header: Vec<&str> = IDENTITY_COLUMNS.to_vec();
    header.extend(["gain-variance", "gain-diversity", "variance-diversity"]);
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![
            record.elitism.name().to_string(),
            record.family.clone(),
            record.use_features.to_string(),
            record.use_hyperparameters.to_string(),
            record.algorithm_index.to_string(),
        ];
        row.push(format_value(record.gain_variance));
        row.push(format_value(record.gain_diversity));
        row.push(format_value(record.variance_diversity));
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the series, alignment and correlation tables of every analysed
/// axis into `dir`, returning the files written.
pub fn write_report(report: &LogReport, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let stem = report.context.stem();
    let resolver = &report.context.resolver;
    let mut written = Vec::new();

    let mut create = |suffix: String| -> Result<BufWriter<File>> {
        let path = dir.join(format!("{stem}_{suffix}.csv"));
        let file = BufWriter::new(File::create(&path)?);
        written.push(path);
        Ok(file)
    };

    for analysis in &report.analyses {
        let axis = analysis.axis.name();

        let file = create(format!("{axis}_series"))?;
        write_series(file, &analysis.series, resolver)?;

        if let Some(index) = analysis.alignment.index() {
            let file = create(format!("{axis}_alignment"))?;
            write_alignment(file, index, resolver)?;
        }

        if let Some(records) = &analysis.correlations {
            let file = create(format!("{axis}_correlations"))?;
            write_correlations(file, records)?;
        }
    }
    Ok(written)
}
