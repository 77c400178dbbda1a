use crate::models::SummaryResponse;
use crate::state::AppState;
use std::fmt::Write as _;

pub fn render_index(state: &AppState, summary: &SummaryResponse) -> String {
    let mut options = String::new();
    for locality in state.table.localities() {
        let selected = if locality == &*state.default_locality {
            " selected"
        } else {
            ""
        };
        let name = escape_html(locality);
        let _ = write!(options, r#"<option value="{name}"{selected}>{name}</option>"#);
    }

    INDEX_HTML
        .replace("{{OPTIONS}}", &options)
        .replace("{{SUMMARY}}", &render_summary(summary))
        .replace("{{GEOJSON_URL}}", &escape_html(&state.geojson_url))
}

/// Summary table markup, or the inline notice that replaces it.
pub fn render_summary(summary: &SummaryResponse) -> String {
    match summary {
        SummaryResponse::Ok { headers, rows, .. } => {
            let mut html = format!(
                r#"<table class="summary"><thead><tr><th>{}</th><th>{}</th></tr></thead><tbody>"#,
                escape_html(headers[0]),
                escape_html(headers[1])
            );
            for row in rows {
                let _ = write!(
                    html,
                    "<tr><td>{}</td><td>{}</td></tr>",
                    escape_html(&row.label),
                    escape_html(&row.value)
                );
            }
            html.push_str("</tbody></table>");
            html
        }
        SummaryResponse::Unavailable { message, .. } => {
            format!(r#"<p class="notice">{}</p>"#, escape_html(message))
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Virginia COVID Dashboard</title>
  <script src="https://cdn.plot.ly/plotly-2.35.2.min.js"></script>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #eef2f5;
      --bg-2: #c9d8e4;
      --ink: #1f2a33;
      --accent: #c8553d;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #e4ebf0 60%, #f4f6f8 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(960px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.3rem;
    }

    .subtitle {
      margin: 6px 0 0;
      color: #5f5c57;
    }

    select {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      min-width: 260px;
    }

    .card {
      background: white;
      border-radius: 20px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
    }

    table.summary {
      width: 100%;
      border-collapse: collapse;
    }

    table.summary th {
      text-align: left;
      background: var(--accent-2);
      color: white;
      padding: 10px 12px;
    }

    table.summary td {
      padding: 10px 12px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    table.summary td:last-child {
      font-weight: 600;
      text-align: right;
    }

    .notice {
      margin: 0;
      color: #c63b2b;
    }

    .facets {
      display: grid;
      gap: 12px;
    }

    .facet-title {
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .facet svg {
      width: 100%;
      height: 180px;
      display: block;
    }

    .chart-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    #map {
      width: 100%;
      height: 420px;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Virginia COVID Dashboard</h1>
      <p class="subtitle">Case reports from the Virginia Department of Health joined with 2019 population estimates.</p>
    </header>

    <section class="card">
      <h2>Local conditions</h2>
      <p><select id="locality" aria-label="Locality">{{OPTIONS}}</select></p>
      <div id="summary">{{SUMMARY}}</div>
    </section>

    <section class="card">
      <h2 id="map-title">COVID cases per 100 people</h2>
      <div id="map" data-geojson="{{GEOJSON_URL}}"></div>
    </section>

    <section class="card">
      <h2>Statewide totals</h2>
      <div class="facets">
        <div class="facet"><div class="facet-title">Total cases</div><svg id="chart-total_cases" viewBox="0 0 800 180"></svg></div>
        <div class="facet"><div class="facet-title">Hospitalizations</div><svg id="chart-hospitalizations" viewBox="0 0 800 180"></svg></div>
        <div class="facet"><div class="facet-title">Deaths</div><svg id="chart-deaths" viewBox="0 0 800 180"></svg></div>
      </div>
    </section>
  </main>

  <script>
    const selectEl = document.getElementById('locality');
    const summaryEl = document.getElementById('summary');
    const mapEl = document.getElementById('map');

    const escapeHtml = (text) => String(text).replace(/[&<>"']/g, (c) => ({
      '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
    })[c]);

    const renderSummary = (data) => {
      if (data.status !== 'ok') {
        summaryEl.innerHTML = `<p class="notice">${escapeHtml(data.message)}</p>`;
        return;
      }
      const rows = data.rows
        .map((row) => `<tr><td>${escapeHtml(row.label)}</td><td>${escapeHtml(row.value)}</td></tr>`)
        .join('');
      summaryEl.innerHTML = `<table class="summary"><thead><tr><th>${escapeHtml(data.headers[0])}</th><th>${escapeHtml(data.headers[1])}</th></tr></thead><tbody>${rows}</tbody></table>`;
    };

    const loadSummary = async (locality) => {
      const res = await fetch(`/api/summary?locality=${encodeURIComponent(locality)}`);
      if (!res.ok) {
        throw new Error(await res.text() || 'Unable to load summary');
      }
      renderSummary(await res.json());
    };

    const formatAxisValue = (value) => {
      if (Math.abs(value) >= 1000000) {
        return `${(value / 1000000).toFixed(1)}M`;
      }
      if (Math.abs(value) >= 1000) {
        return `${(value / 1000).toFixed(0)}k`;
      }
      return Math.round(value).toString();
    };

    const renderLineChart = (chartEl, points) => {
      if (!points.length) {
        chartEl.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data</text>';
        return;
      }

      const width = 800;
      const height = 180;
      const paddingX = 52;
      const paddingY = 28;
      const top = 12;

      const values = points.map((point) => point.value);
      let min = Math.min(0, ...values);
      let max = Math.max(...values);
      if (min === max) {
        max += 1;
      }

      const range = max - min;
      const xStep = points.length > 1 ? (width - paddingX * 2) / (points.length - 1) : 0;
      const scaleY = (height - top - paddingY) / range;
      const x = (index) => paddingX + index * xStep;
      const y = (value) => height - paddingY - (value - min) * scaleY;

      const path = points
        .map((point, index) => `${index === 0 ? 'M' : 'L'} ${x(index).toFixed(2)} ${y(point.value).toFixed(2)}`)
        .join(' ');

      const ticks = 3;
      let grid = '';
      for (let i = 0; i <= ticks; i += 1) {
        const value = min + (range * i) / ticks;
        const yPos = y(value);
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${yPos}" x2="${width - paddingX}" y2="${yPos}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${yPos + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }

      const labelEvery = Math.max(1, Math.ceil(points.length / 6));
      const xLabels = points
        .map((point, index) => {
          if (index % labelEvery !== 0) {
            return '';
          }
          return `<text class="chart-label" x="${x(index)}" y="${height - paddingY + 18}" text-anchor="middle">${point.label}</text>`;
        })
        .join('');

      chartEl.innerHTML = `${grid}<path class="chart-line" d="${path}" />${xLabels}`;
    };

    const loadStatewide = async () => {
      const res = await fetch('/api/statewide');
      if (!res.ok) {
        throw new Error('Unable to load statewide totals');
      }
      const points = await res.json();
      ['total_cases', 'hospitalizations', 'deaths'].forEach((outcome) => {
        const series = points
          .filter((point) => point.outcome === outcome)
          .map((point) => ({ label: point.report_date, value: point.count }));
        renderLineChart(document.getElementById(`chart-${outcome}`), series);
      });
    };

    const loadMap = async () => {
      const res = await fetch('/api/rates');
      if (!res.ok) {
        throw new Error('Unable to load rates');
      }
      const data = await res.json();
      if (data.report_date) {
        document.getElementById('map-title').textContent = `COVID cases per 100 people, ${data.report_date}`;
      }
      const rows = data.rows.filter((row) => row.cases_per_100 !== null);
      Plotly.newPlot(mapEl, [{
        type: 'choropleth',
        geojson: mapEl.dataset.geojson,
        locations: rows.map((row) => row.fips),
        z: rows.map((row) => row.cases_per_100),
        text: rows.map((row) => row.locality),
        hovertemplate: '%{text}<br>%{z:.2f} per 100<extra></extra>',
        colorscale: 'Viridis',
        colorbar: { title: 'per 100' }
      }], {
        geo: { scope: 'usa', fitbounds: 'locations', visible: false },
        margin: { r: 0, t: 0, l: 0, b: 0 }
      }, { responsive: true });
    };

    const showError = (err) => {
      summaryEl.insertAdjacentHTML('beforeend', `<p class="notice">${escapeHtml(err.message)}</p>`);
    };

    selectEl.addEventListener('change', () => {
      loadSummary(selectEl.value).catch(showError);
    });

    loadStatewide().catch(showError);
    loadMap().catch(showError);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::models::{JoinReport, SummaryRow};
    use crate::table::{UnifiedTable, fixtures::record};
    use chrono::NaiveDate;

    fn state() -> AppState {
        let date = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        let table = UnifiedTable::from_records(vec![
            record("Charlottesville", "51540", date, 10),
            record("King & Queen", "51097", date, 3),
        ])
        .unwrap();
        let config = Config::from_lookup(|_| None);
        AppState::new(&config, table, JoinReport::default())
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn index_selects_default_locality() {
        let summary = SummaryResponse::Unavailable {
            locality: "Charlottesville".into(),
            reason: "missing_data",
            message: "insufficient data".into(),
        };
        let html = render_index(&state(), &summary);
        assert!(html.contains(r#"<option value="Charlottesville" selected>"#));
        assert!(html.contains("King &amp; Queen"));
        assert!(html.contains(r#"<p class="notice">insufficient data</p>"#));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn summary_table_lists_rows_in_order() {
        let summary = SummaryResponse::Ok {
            headers: ["Local Conditions", ""],
            rows: vec![
                SummaryRow { label: "Locality".into(), value: "Norton".into() },
                SummaryRow { label: "VDH Health District".into(), value: "Lenowisco".into() },
            ],
            summary: crate::models::TrendSummary {
                locality: "Norton".into(),
                health_district: "Lenowisco".into(),
                as_of: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
                anchor_date: NaiveDate::from_ymd_opt(2021, 5, 1).unwrap(),
                used_fallback: false,
                back14: NaiveDate::from_ymd_opt(2021, 4, 17).unwrap(),
                back28: NaiveDate::from_ymd_opt(2021, 4, 3).unwrap(),
                recent_new_cases: 1,
                prior_new_cases: 1,
                change: 0,
                percent_change: 0.0,
            },
        };
        let html = render_summary(&summary);
        assert!(html.starts_with(r#"<table class="summary">"#));
        let locality = html.find("Norton").unwrap();
        let district = html.find("Lenowisco").unwrap();
        assert!(locality < district);
    }
}
