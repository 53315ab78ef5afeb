pub mod cartera;
pub mod de;
pub mod report;

pub use cartera::{CarteraRow, ClientRow, CobroRow, FacturacionRow, MonthTotalRow};
pub use report::{
    AgingBucket, AgingReport, CarteraSummary, GroupReport, GroupTotal, InvoicingReport,
    InvoicingTotals, MonthlyInvoicing, MonthlyTrendPoint, MonthlyTrendReport, WeeklyReport,
    WeeklySummary, WeeklyTotals,
};
