//! Plotly figure description.
//!
//! Only the subset of the plotly.js schema the page needs: named line traces,
//! an optional shaded band, a title and the x-axis range slider. Drawing is
//! left to plotly.js.

use serde::Serialize;

use crate::series::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Layout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub mode: &'static str,
    pub name: String,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<LineStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub showlegend: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: Title,
    pub xaxis: Axis,
    pub yaxis: Axis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Title {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Axis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<Title>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rangeslider: Option<RangeSlider>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub visible: bool,
}

impl Figure {
    pub fn new(title: &str) -> Self {
        Self {
            data: Vec::new(),
            layout: Layout {
                title: Title { text: title.to_string() },
                xaxis: Axis::default(),
                yaxis: Axis::default(),
            },
        }
    }

    pub fn line(mut self, name: &str, series: &PriceSeries) -> Self {
        self.data.push(Trace {
            kind: "scatter",
            mode: "lines",
            name: name.to_string(),
            x: series.dates().iter().map(|d| d.to_string()).collect(),
            y: series.values(),
            fill: None,
            line: None,
            showlegend: None,
        });
        self
    }

    /// Shaded area between `lower` and `upper`, drawn as two traces.
    pub fn band(mut self, name: &str, lower: &PriceSeries, upper: &PriceSeries) -> Self {
        let faint = || Some(LineStyle { width: 0.0, color: Some("rgba(0,0,0,0)".to_string()) });
        self.data.push(Trace {
            kind: "scatter",
            mode: "lines",
            name: format!("{} (lower)", name),
            x: lower.dates().iter().map(|d| d.to_string()).collect(),
            y: lower.values(),
            fill: None,
            line: faint(),
            showlegend: Some(false),
        });
        self.data.push(Trace {
            kind: "scatter",
            mode: "lines",
            name: name.to_string(),
            x: upper.dates().iter().map(|d| d.to_string()).collect(),
            y: upper.values(),
            fill: Some("tonexty"),
            line: faint(),
            showlegend: None,
        });
        self
    }

    pub fn range_slider(mut self, visible: bool) -> Self {
        self.layout.xaxis.rangeslider = Some(RangeSlider { visible });
        self
    }

    pub fn y_title(mut self, text: &str) -> Self {
        self.layout.yaxis.title = Some(Title { text: text.to_string() });
        self
    }

    pub fn trace_names(&self) -> Vec<&str> {
        self.data.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Standalone page that draws the figure with plotly.js from its CDN.
    pub fn to_html(&self) -> serde_json::Result<String> {
        // keep "</script>" inside string data from closing the tag
        let json = serde_json::to_string(self)?.replace("</", "<\\/");
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
             <script src=\"https://cdn.plot.ly/plotly-2.27.0.min.js\"></script>\n</head>\n<body>\n\
             <div id=\"chart\" style=\"width:100%;height:520px;\"></div>\n<script>\n\
             const fig = {json};\nPlotly.newPlot('chart', fig.data, fig.layout, {{responsive: true}});\n\
             </script>\n</body>\n</html>\n",
            title = crate::page::escape_html(&self.layout.title.text),
            json = json,
        ))
    }
}
