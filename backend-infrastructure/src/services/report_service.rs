use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use tokio::fs;
use tracing::info;

use backend_domain::ModelInfo;
use backend_model::evaluation::{ClassMetrics, CurvePoint};
use backend_model::training::SampleCounts;
use backend_model::EvaluationReport;

const CHART_SIZE: f64 = 320.0;
const CHART_PAD: f64 = 40.0;

#[derive(Debug, Serialize)]
pub struct EvaluationDocument<'a> {
    pub generated_at: String,
    pub model: &'a ModelInfo,
    pub samples: &'a SampleCounts,
    pub evaluation: &'a EvaluationReport,
}

#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Writes `evaluation.json` and `evaluation.html` into `report_dir`.
pub async fn write_evaluation_report(
    report_dir: &Path,
    model: &ModelInfo,
    samples: &SampleCounts,
    evaluation: &EvaluationReport,
) -> Result<ReportPaths> {
    fs::create_dir_all(report_dir).await?;
    let document = EvaluationDocument {
        generated_at: Utc::now().to_rfc3339(),
        model,
        samples,
        evaluation,
    };
    let json_path = report_dir.join("evaluation.json");
    fs::write(&json_path, serde_json::to_string_pretty(&document)?).await?;

    let html_path = report_dir.join("evaluation.html");
    fs::write(&html_path, render_evaluation_report(&document)).await?;

    info!(
        json = %json_path.display(),
        html = %html_path.display(),
        roc_auc = evaluation.roc_auc,
        "evaluation report written"
    );
    Ok(ReportPaths {
        json: json_path,
        html: html_path,
    })
}

pub fn render_evaluation_report(document: &EvaluationDocument<'_>) -> String {
    let evaluation = document.evaluation;
    let matrix = evaluation.confusion_matrix.as_rows();
    let report = &evaluation.classification;

    let mut metric_rows = String::new();
    for (label, metrics) in [
        ("legit (0)", &report.legit),
        ("fraud (1)", &report.fraud),
        ("macro avg", &report.macro_avg),
        ("weighted avg", &report.weighted_avg),
    ] {
        metric_rows.push_str(&metric_row(label, metrics));
    }

    let roc = render_curve(
        &evaluation.roc_curve,
        "False positive rate",
        "True positive rate",
        true,
    );
    let pr = render_curve(&evaluation.pr_curve, "Recall", "Precision", false);

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>Fraud model evaluation {model_id}</title>
<style>
:root {{
  --ink: #0f172a;
  --muted: #64748b;
  --border: #e2e8f0;
  --accent: #2563eb;
  --fraud: #dc2626;
}}
* {{ box-sizing: border-box; }}
body {{
  margin: 0;
  font-family: "IBM Plex Sans", "Source Sans 3", sans-serif;
  background: radial-gradient(circle at top, #1e293b 0%, #0f172a 55%, #0b1220 100%);
  color: #e2e8f0;
}}
.page {{ max-width: 1100px; margin: 0 auto; padding: 32px 20px 48px; }}
.hero h1 {{ margin: 0 0 6px; font-size: 26px; }}
.hero p {{ margin: 0; color: #94a3b8; font-size: 13px; }}
.summary {{
  display: grid;
  grid-template-columns: repeat(auto-fit, minmax(170px, 1fr));
  gap: 12px;
  margin-top: 18px;
}}
.card {{
  background: rgba(255,255,255,0.96);
  color: var(--ink);
  padding: 16px 18px;
  border-radius: 14px;
}}
.card .label {{ font-size: 11px; text-transform: uppercase; letter-spacing: 0.12em; color: var(--muted); }}
.card .value {{ font-size: 22px; font-weight: 700; margin-top: 6px; }}
.panels {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(360px, 1fr)); gap: 16px; margin-top: 22px; }}
.panel {{ background: #ffffff; color: var(--ink); border-radius: 14px; padding: 18px; }}
.panel h2 {{ margin: 0 0 12px; font-size: 16px; }}
table {{ width: 100%; border-collapse: collapse; font-size: 13px; }}
th, td {{ padding: 8px 10px; border-bottom: 1px solid var(--border); text-align: right; }}
th:first-child, td:first-child {{ text-align: left; }}
svg text {{ font-size: 11px; fill: var(--muted); }}
</style>
</head>
<body>
<div class="page">
  <section class="hero">
    <h1>Fraud model evaluation</h1>
    <p>model {model_id} &middot; trained {trained_at} &middot; generated {generated_at}</p>
    <div class="summary">
      <div class="card"><div class="label">ROC AUC</div><div class="value">{roc_auc:.4}</div></div>
      <div class="card"><div class="label">Average precision</div><div class="value">{average_precision:.4}</div></div>
      <div class="card"><div class="label">Accuracy</div><div class="value">{accuracy:.4}</div></div>
      <div class="card"><div class="label">Train / test rows</div><div class="value">{train} / {test}</div></div>
      <div class="card"><div class="label">Resampled train</div><div class="value">{resampled}</div></div>
    </div>
  </section>
  <div class="panels">
    <section class="panel">
      <h2>Confusion matrix</h2>
      <table>
        <tr><th>actual \ predicted</th><th>0</th><th>1</th></tr>
        <tr><td>0</td><td>{tn}</td><td>{fp}</td></tr>
        <tr><td>1</td><td>{fn_}</td><td>{tp}</td></tr>
      </table>
    </section>
    <section class="panel">
      <h2>Classification report</h2>
      <table>
        <tr><th></th><th>precision</th><th>recall</th><th>f1</th><th>support</th></tr>
        {metric_rows}
      </table>
    </section>
    <section class="panel">
      <h2>ROC curve</h2>
      {roc}
    </section>
    <section class="panel">
      <h2>Precision-recall curve</h2>
      {pr}
    </section>
  </div>
</div>
</body>
</html>"#,
        model_id = document.model.model_id,
        trained_at = document.model.trained_at,
        generated_at = document.generated_at,
        roc_auc = evaluation.roc_auc,
        average_precision = evaluation.average_precision,
        accuracy = report.accuracy,
        train = document.samples.train,
        test = document.samples.test,
        resampled = document.samples.resampled_train,
        tn = matrix[0][0],
        fp = matrix[0][1],
        fn_ = matrix[1][0],
        tp = matrix[1][1],
        metric_rows = metric_rows,
        roc = roc,
        pr = pr,
    )
}

fn metric_row(label: &str, metrics: &ClassMetrics) -> String {
    format!(
        "<tr><td>{}</td><td>{:.4}</td><td>{:.4}</td><td>{:.4}</td><td>{}</td></tr>",
        label, metrics.precision, metrics.recall, metrics.f1, metrics.support
    )
}

/// Renders a unit-square curve as an inline SVG polyline.
fn render_curve(points: &[CurvePoint], x_label: &str, y_label: &str, diagonal: bool) -> String {
    let full = CHART_SIZE + 2.0 * CHART_PAD;
    let mut polyline = String::new();
    for point in points {
        let (x, y) = project(point.x, point.y);
        let _ = write!(polyline, "{:.2},{:.2} ", x, y);
    }
    let (x0, y0) = project(0.0, 0.0);
    let (x1, y1) = project(1.0, 1.0);
    let reference = if diagonal {
        format!(
            r##"<line x1="{x0:.2}" y1="{y0:.2}" x2="{x1:.2}" y2="{y1:.2}" stroke="#cbd5e1" stroke-dasharray="4 4" />"##
        )
    } else {
        String::new()
    };
    format!(
        r##"<svg viewBox="0 0 {full} {full}" width="100%" role="img">
<rect x="{pad}" y="{pad}" width="{size}" height="{size}" fill="none" stroke="#e2e8f0" />
{reference}
<polyline points="{polyline}" fill="none" stroke="#2563eb" stroke-width="2" />
<text x="{label_x:.2}" y="{bottom:.2}" text-anchor="middle">{x_label}</text>
<text x="12" y="{label_y:.2}" transform="rotate(-90 12 {label_y:.2})" text-anchor="middle">{y_label}</text>
</svg>"##,
        full = full,
        pad = CHART_PAD,
        size = CHART_SIZE,
        reference = reference,
        polyline = polyline.trim_end(),
        label_x = CHART_PAD + CHART_SIZE / 2.0,
        bottom = full - 10.0,
        label_y = CHART_PAD + CHART_SIZE / 2.0,
        x_label = x_label,
        y_label = y_label,
    )
}

fn project(x: f64, y: f64) -> (f64, f64) {
    let x = x.clamp(0.0, 1.0);
    let y = y.clamp(0.0, 1.0);
    (CHART_PAD + x * CHART_SIZE, CHART_PAD + (1.0 - y) * CHART_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model_info() -> ModelInfo {
        ModelInfo {
            model_id: "model-1".to_string(),
            trained_at: "2024-03-09T13:00:00+00:00".to_string(),
            format_version: 1,
            checksum: "abc".to_string(),
            feature_columns: vec!["amt".to_string()],
            categorical_columns: Vec::new(),
            threshold: 0.5,
        }
    }

    fn samples() -> SampleCounts {
        SampleCounts {
            total: 8,
            train: 5,
            test: 3,
            resampled_train: 6,
            train_fraud: 2,
            test_fraud: 1,
        }
    }

    #[test]
    fn projects_unit_square_into_chart() {
        assert_eq!(project(0.0, 0.0), (CHART_PAD, CHART_PAD + CHART_SIZE));
        assert_eq!(project(1.0, 1.0), (CHART_PAD + CHART_SIZE, CHART_PAD));
        assert_eq!(project(2.0, -1.0), project(1.0, 0.0));
    }

    #[test]
    fn html_contains_metrics_and_curves() {
        let evaluation = EvaluationReport::evaluate(&[0, 0, 1], &[0.1, 0.7, 0.9], 0.5);
        let info = model_info();
        let counts = samples();
        let document = EvaluationDocument {
            generated_at: "now".to_string(),
            model: &info,
            samples: &counts,
            evaluation: &evaluation,
        };
        let html = render_evaluation_report(&document);
        assert!(html.contains("model model-1"));
        assert_eq!(html.matches("<polyline").count(), 2);
        assert!(html.contains("stroke-dasharray"));
        assert!(html.contains("fraud (1)"));
    }

    #[tokio::test]
    async fn writes_json_and_html() {
        let dir = tempfile::tempdir().expect("tempdir");
        let evaluation = EvaluationReport::evaluate(&[0, 1, 0, 1], &[0.2, 0.8, 0.4, 0.6], 0.5);
        let paths = write_evaluation_report(
            &dir.path().join("reports"),
            &model_info(),
            &samples(),
            &evaluation,
        )
        .await
        .expect("report");
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&paths.json).expect("json"))
                .expect("parse");
        assert_eq!(json["model"]["model_id"], "model-1");
        assert_eq!(json["evaluation"]["roc_auc"], 1.0);
        assert!(paths.html.exists());
    }
}
