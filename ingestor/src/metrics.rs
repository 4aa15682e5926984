use crate::errors::{Error, Result};
use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Histogram, HistogramOpts, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref READINGS_INGESTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_readings_ingested_total",
        "Total readings written or merged into their bucket"
    ))
    .unwrap();
    pub static ref READINGS_REJECTED_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_readings_rejected_total",
        "Total ingest submissions rejected by validation"
    ))
    .unwrap();
    pub static ref QUERIES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_queries_total",
        "Total successful rolling window queries"
    ))
    .unwrap();
    pub static ref DB_FAILURES_TOTAL: Counter = Counter::with_opts(Opts::new(
        "ingestor_db_failures_total",
        "Total failed store operations"
    ))
    .unwrap();
    pub static ref INGEST_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ingestor_ingest_latency_seconds",
            "Time taken to upsert a reading"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
    pub static ref QUERY_LATENCY_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ingestor_query_latency_seconds",
            "Time taken to fetch the rolling window"
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0
        ])
    )
    .unwrap();
}

pub fn init_metrics() -> Result<()> {
    let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(READINGS_INGESTED_TOTAL.clone()),
        Box::new(READINGS_REJECTED_TOTAL.clone()),
        Box::new(QUERIES_TOTAL.clone()),
        Box::new(DB_FAILURES_TOTAL.clone()),
        Box::new(INGEST_LATENCY_SECONDS.clone()),
        Box::new(QUERY_LATENCY_SECONDS.clone()),
    ];

    for collector in collectors {
        REGISTRY
            .register(collector)
            .map_err(|e| Error::Metrics(e.to_string()))?;
    }

    Ok(())
}

pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::Metrics(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| Error::Metrics(e.to_string()))
}
