use anyhow::Result;
use clap::Parser;
use energy_analytics::{
    analysis::{
        cost_breakdown, load_duration_curve, power_overview, BaselineCalculator, OutOfHoursSegmenter,
        PeakContext, PeakMode, PeakWindowDetector,
    },
    cli::{emit, Cli, CommonArgs, FileSource, Report},
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sources::InvoiceFileSource,
    transform::{EnergyToPower, ReadingValidation, TotalColumn},
};
use meter_data::domain::BaselineKind;
use std::path::Path;
use time::Duration;

/// Validated meter export, optionally restricted to a year range and
/// extended with the site total column.
fn pipeline(path: &Path, common: &CommonArgs, with_total: bool) -> Pipeline<FileSource> {
    let mut pipeline = Pipeline::new(common.source(path)).with_transform(ReadingValidation);
    if let Some(years) = common.years {
        pipeline = pipeline.with_transform(years);
    }
    if with_total {
        pipeline = pipeline.with_transform(TotalColumn::default());
    }
    pipeline
}

fn main() -> Result<()> {
    observability::init_tracing();

    let cli = Cli::parse();
    let cfg = AppConfig::load()?;
    let analysis = &cfg.analysis;
    let step: Duration = analysis.nominal_step();
    let baselines = |column: &str| BaselineCalculator::new(analysis.baseline_quantile, cfg.work_hours(column));

    match cli.report {
        Report::Baselines(args) => {
            let table = pipeline(&args.path, &args.common, true).run()?;
            let computed = baselines(&args.column).compute(&table, &args.column)?;
            let levels: Vec<_> = BaselineKind::ALL
                .into_iter()
                .flat_map(|kind| computed.levels(kind))
                .collect();
            emit(&levels, args.common.format())?;
        }
        Report::OutOfHours(args) => {
            let meter = &args.meter;
            let table = pipeline(&meter.path, &meter.common, true).run()?;
            let segmenter = OutOfHoursSegmenter {
                baselines: baselines(&meter.column),
                step,
                top_n: analysis.top_n,
                expected_baseline: analysis.expected_baseline,
            };
            let kind = args.baseline.unwrap_or(analysis.baseline);
            let periods = segmenter.find_top_periods(&table, &meter.column, kind)?;
            emit(&periods, meter.common.format())?;
        }
        Report::Peaks(args) => {
            let table = pipeline(&args.path, &args.common, true).run()?;
            let detector = PeakWindowDetector {
                mode: PeakMode::Consumption,
                window_steps: analysis.rolling_window_steps,
                top_n: analysis.top_n,
                min_separation_days: analysis.min_separation_days,
            };
            let peaks = detector.find_top_instants(&table, &args.column, None)?;
            emit(&peaks, args.common.format())?;
        }
        Report::Demand(args) => {
            let table = pipeline(&args.path, &args.common, true)
                .with_transform(EnergyToPower {
                    column: args.column.clone(),
                    step,
                })
                .run()?;
            let detector = PeakWindowDetector {
                mode: PeakMode::Demand,
                window_steps: analysis.rolling_window_steps,
                top_n: analysis.top_n,
                min_separation_days: analysis.min_separation_days,
            };
            let peaks = detector.find_top_instants(&table, &args.column, cfg.demand_limit(&args.column))?;
            emit(&peaks, args.common.format())?;
        }
        Report::PowerOverview(args) => {
            let table = pipeline(&args.path, &args.common, false).run()?;
            let profiles = power_overview(&table, &cfg.demand_limits(), step);
            emit(&profiles, args.common.format())?;
        }
        Report::LoadDuration(args) => {
            let table = pipeline(&args.path, &args.common, true).run()?;
            let curve = load_duration_curve(&table, &args.column, step)?;
            emit(&curve, args.common.format())?;
        }
        Report::PeakContext(args) => {
            let table = pipeline(&args.path, &args.common, true).run()?;
            let kind = args.baseline.unwrap_or(analysis.baseline);
            let readings = PeakContext::new(baselines(&args.column)).readings(
                &table,
                &args.column,
                args.date,
                kind,
            )?;
            emit(&readings, args.common.format())?;
        }
        Report::Costs(args) => {
            let mut invoices = InvoiceFileSource::new(&args.path, args.common.invoice_kind()).load()?;
            if let Some(years) = args.common.years {
                invoices = invoices.select_years(years.first, years.last);
            }
            let entries = cost_breakdown(&invoices, &args.meter, args.view());
            emit(&entries, args.common.format())?;
        }
    }

    Ok(())
}
