pub mod chart_service;
pub mod collect_service;
pub mod dedup_service;
pub mod report_service;
pub mod series_service;
