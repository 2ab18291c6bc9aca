//! Chart generation for the reports page.
//!
//! The income vs expenses chart is an ECharts grouped bar chart: one bar
//! pair per calendar month, in chronological order. The chart options are
//! generated as JSON with `charming` and rendered with an HTML container
//! plus JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisType, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::aggregation::{MonthlyBucket, month_label};

/// The HTML element ID of the chart container.
const CHART_CONTAINER_ID: &str = "income-expenses-chart";

pub(super) fn income_expenses_chart(series: &[MonthlyBucket]) -> Chart {
    let labels: Vec<String> = series.iter().map(|bucket| month_label(bucket.month)).collect();
    let income: Vec<f64> = series.iter().map(|bucket| bucket.income).collect();
    let expenses: Vec<f64> = series.iter().map(|bucket| bucket.expenses).collect();

    Chart::new()
        .title(Title::new().text("Income vs. Expenses"))
        .tooltip(Tooltip::new().trigger(Trigger::Axis))
        .legend(Legend::new().top("5%"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(Axis::new().type_(AxisType::Value))
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expenses").data(expenses))
}

/// Render the chart container together with its initialization script.
///
/// The script sits next to the container rather than in the page head so
/// that the chart re-initializes when the surrounding live region is
/// swapped in by HTMX.
pub(super) fn chart_view(chart: &Chart) -> Markup {
    let options = chart.to_string();

    let script = format!(
        r#"(function() {{
            const chartDom = document.getElementById("{CHART_CONTAINER_ID}");
            if (chartDom === null || typeof echarts === "undefined") {{
                return;
            }}
            const chart = echarts.init(chartDom);
            chart.setOption({options});
            window.addEventListener('resize', chart.resize);
        }})();"#
    );

    html! {
        div
            id=(CHART_CONTAINER_ID)
            class="min-h-[400px] w-full rounded dark:bg-gray-100"
        {}

        script { (PreEscaped(script)) }
    }
}
