//! 仪表盘：KPI、收入曲线、库存对比、分类分布和低库存清单

pub mod aggregator;
pub mod handler;
pub mod model;
pub mod service;
