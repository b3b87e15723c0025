use anyhow::Result;
use clap::Parser;
use energy_analytics::{
    analysis::monthly_summary,
    cli::{emit, SummaryCli},
    observability,
    pipeline::Pipeline,
    sinks::summary_rows,
    transform::{MonthlyResample, ReadingValidation, TotalColumn},
};
use meter_data::domain::EnergyUnit;

fn main() -> Result<()> {
    observability::init_tracing();

    let cli = SummaryCli::parse();
    let args = &cli.meter;
    let unit = if cli.mwh { EnergyUnit::Mwh } else { EnergyUnit::Kwh };

    let mut pipeline = Pipeline::new(args.common.source(&args.path)).with_transform(ReadingValidation);
    if let Some(years) = args.common.years {
        pipeline = pipeline.with_transform(years);
    }
    let monthly = pipeline
        .with_transform(TotalColumn::default())
        .with_transform(MonthlyResample)
        .run()?;

    let summary = monthly_summary(&monthly, &args.column, unit)?;
    emit(&summary_rows(&summary), args.common.format())?;

    Ok(())
}
