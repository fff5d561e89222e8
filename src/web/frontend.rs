//! Embedded HTML/CSS/JS frontend for the agrifinance dashboard.
//!
//! The page is compiled into the binary as a template and filled from a
//! [`DashboardState`]: form defaults, select options, the gauge and the
//! interpretation are rendered server-side. The page script then owns the
//! submission lifecycle in the browser, following the same rules as
//! [`crate::dashboard::reduce`]: a request token per submission, only the
//! latest reply updates the view, loading cleared when it lands. Once the
//! proxy answers, the script restyles the rendered gauge itself from the
//! bootstrap constants, so a score never depends on a second request.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::dashboard::client::{FALLBACK_MESSAGE, PROXY_PATH};
use crate::dashboard::form::{COORDINATE_STEP, LAND_AREA_MIN, LAND_AREA_STEP, YEAR_RANGE};
use crate::dashboard::gauge::ARC_LENGTH;
use crate::dashboard::score::{
    AMBER, EXCELLENT_THRESHOLD, GREEN, MAX_SCORE, MODERATE_THRESHOLD, RED,
};
use crate::dashboard::state::SUCCESS_MESSAGE;
use crate::dashboard::{Band, CropType, DashboardState, Region, Status};

/// Values the page script needs at start-up.
#[derive(Serialize)]
struct Bootstrap {
    proxy_path: &'static str,
    fallback_message: &'static str,
    max_score: f64,
    excellent_threshold: f64,
    moderate_threshold: f64,
    arc_length: f64,
    bands: BandTable,
}

#[derive(Serialize)]
struct BandTable {
    excellent: BandStyle,
    moderate: BandStyle,
    limited: BandStyle,
    no_data: BandStyle,
}

/// How the result panel draws one band.
#[derive(Serialize)]
struct BandStyle {
    label: &'static str,
    description: &'static str,
    color: &'static str,
}

impl BandStyle {
    fn new(band: Band, color: &'static str) -> Self {
        Self {
            label: band.label(),
            description: band.description(),
            color,
        }
    }
}

impl Bootstrap {
    fn new() -> Self {
        Self {
            proxy_path: PROXY_PATH,
            fallback_message: FALLBACK_MESSAGE,
            max_score: MAX_SCORE,
            excellent_threshold: EXCELLENT_THRESHOLD,
            moderate_threshold: MODERATE_THRESHOLD,
            arc_length: ARC_LENGTH,
            bands: BandTable {
                excellent: BandStyle::new(Band::Excellent, GREEN),
                moderate: BandStyle::new(Band::Moderate, AMBER),
                limited: BandStyle::new(Band::Limited, RED),
                no_data: BandStyle::new(Band::NoData, RED),
            },
        }
    }
}

/// Render the full dashboard page for a state.
pub fn render_index(state: &DashboardState) -> Result<String> {
    let view = state.view();
    let bootstrap = Bootstrap::new();
    let bootstrap_json = script_json(&bootstrap)?;

    let (success_hidden, error_hidden, error_text) = match &state.status {
        Status::Success => ("", "hidden", String::new()),
        Status::Error(message) => ("hidden", "", escape_html(message)),
        Status::Idle => ("hidden", "hidden", String::new()),
    };

    let form = &state.form;
    let html = INDEX_HTML
        .replace("{{REGION_OPTIONS}}", &region_options(form.region))
        .replace("{{CROP_OPTIONS}}", &crop_options(form.crop_type))
        .replace("{{LATITUDE}}", &form.latitude.to_string())
        .replace("{{LONGITUDE}}", &form.longitude.to_string())
        .replace("{{LAND_AREA}}", &form.land_area.to_string())
        .replace("{{YEAR}}", &form.yield_estimation_year.to_string())
        .replace("{{YEAR_MIN}}", &YEAR_RANGE.start().to_string())
        .replace("{{YEAR_MAX}}", &YEAR_RANGE.end().to_string())
        .replace("{{AREA_MIN}}", &LAND_AREA_MIN.to_string())
        .replace("{{AREA_STEP}}", &LAND_AREA_STEP.to_string())
        .replace("{{COORD_STEP}}", &format!("{COORDINATE_STEP:.6}"))
        .replace("{{BUTTON_DISABLED}}", if state.loading { "disabled" } else { "" })
        .replace(
            "{{BUTTON_TEXT}}",
            if state.loading {
                "Processing"
            } else {
                "Calculate Agri Financial Score"
            },
        )
        .replace("{{GAUGE_SVG}}", &view.gauge_svg)
        .replace("{{BAND_LABEL}}", view.label)
        .replace("{{BAND_DESCRIPTION}}", view.description)
        .replace("{{SUCCESS_HIDDEN}}", success_hidden)
        .replace("{{SUCCESS_MESSAGE}}", SUCCESS_MESSAGE)
        .replace("{{ERROR_HIDDEN}}", error_hidden)
        .replace("{{ERROR_TEXT}}", &error_text)
        .replace("{{BOOTSTRAP_JSON}}", &bootstrap_json);

    Ok(html)
}

/// Serialize a value for inlining in a `<script>` element.
fn script_json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)
        .context("failed to serialize page bootstrap data")?
        // keep the payload from closing the <script> element
        .replace("</", "<\\/"))
}

fn region_options(selected: Region) -> String {
    Region::ALL
        .iter()
        .map(|r| option(r.as_str(), &r.label(), *r == selected))
        .collect()
}

fn crop_options(selected: CropType) -> String {
    CropType::ALL
        .iter()
        .map(|c| option(c.as_str(), &c.label(), *c == selected))
        .collect()
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{value}"{}>{}</option>"#,
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

/// The dashboard page template.
const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>AgriFinance Dashboard</title>
<style>
:root {
  --bg: #f9fafb;
  --surface: #ffffff;
  --border: #e5e7eb;
  --text: #111827;
  --text-muted: #6b7280;
  --accent: #111827;
  --green: #16a34a;
  --green-bg: #f0fdf4;
  --green-border: #bbf7d0;
  --red: #dc2626;
  --red-bg: #fef2f2;
  --red-border: #fecaca;
  --radius: 10px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

/* Layout */
.app {
  max-width: 960px;
  margin: 0 auto;
  padding: 32px 16px;
}

header { text-align: center; margin-bottom: 32px; }
header h1 { font-size: 30px; font-weight: 700; }
header p { color: var(--text-muted); margin-top: 8px; }

.grid {
  display: grid;
  grid-template-columns: 2fr 1fr;
  gap: 24px;
}
@media (max-width: 900px) { .grid { grid-template-columns: 1fr; } }

/* Cards */
.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  box-shadow: 0 2px 6px rgba(0,0,0,0.06);
  padding: 24px;
  display: flex;
  flex-direction: column;
}
.card h2 { font-size: 18px; font-weight: 600; }
.card .desc { color: var(--text-muted); font-size: 13px; margin-bottom: 20px; }

/* Form */
.row { display: flex; gap: 16px; margin-bottom: 20px; }
.row > .field { flex: 1; }
.field { margin-bottom: 20px; }
.row .field { margin-bottom: 0; }
label { display: block; font-weight: 500; margin-bottom: 6px; }
input, select {
  width: 100%;
  padding: 8px 10px;
  border: 1px solid var(--border);
  border-radius: 6px;
  font-size: 14px;
  background: var(--surface);
  color: var(--text);
}
input:focus, select:focus { outline: 2px solid #9ca3af; outline-offset: 1px; }

button {
  width: 100%;
  padding: 10px 16px;
  border: none;
  border-radius: 6px;
  background: var(--accent);
  color: #fff;
  font-size: 14px;
  font-weight: 500;
  cursor: pointer;
  display: inline-flex;
  align-items: center;
  justify-content: center;
  gap: 8px;
  margin-top: auto;
}
button:disabled { opacity: 0.6; cursor: not-allowed; }
.spinner {
  width: 14px; height: 14px;
  border: 2px solid rgba(255,255,255,0.4);
  border-top-color: #fff;
  border-radius: 50%;
  animation: spin 0.8s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }

/* Gauge */
.gauge-wrap { width: 192px; height: 192px; margin: 0 auto 16px; }
.gauge { width: 100%; height: 100%; }
.gauge-fill { transition: stroke-dasharray 0.4s, stroke 0.4s; }
.interpretation { text-align: center; margin-top: 8px; }
.interpretation h3 { font-size: 15px; font-weight: 600; }
.interpretation p { color: var(--text-muted); font-size: 13px; margin-top: 4px; }

/* Status banners */
.status { margin-top: 24px; }
.alert {
  border-radius: 8px;
  padding: 12px 16px;
  border: 1px solid;
}
.alert strong { display: block; margin-bottom: 2px; }
.alert.success { background: var(--green-bg); border-color: var(--green-border); }
.alert.success strong { color: var(--green); }
.alert.error { background: var(--red-bg); border-color: var(--red-border); }
.alert.error strong { color: var(--red); }
.hidden { display: none; }
</style>
</head>
<body>
<div class="app">
  <header>
    <h1>AgriFinance Dashboard</h1>
    <p>Analyze agricultural land and crop potential</p>
  </header>

  <div class="grid">
    <!-- Input form -->
    <form class="card" id="score-form" novalidate>
      <h2>Land &amp; Crop Information</h2>
      <p class="desc">Enter details about your agricultural project</p>

      <div class="row">
        <div class="field">
          <label for="region">Region</label>
          <select id="region" name="region">{{REGION_OPTIONS}}</select>
        </div>
        <div class="field">
          <label for="crop_type">Crop Type</label>
          <select id="crop_type" name="crop_type">{{CROP_OPTIONS}}</select>
        </div>
      </div>

      <div class="row">
        <div class="field">
          <label for="latitude">Latitude</label>
          <input id="latitude" name="latitude" type="number" step="{{COORD_STEP}}" value="{{LATITUDE}}">
        </div>
        <div class="field">
          <label for="longitude">Longitude</label>
          <input id="longitude" name="longitude" type="number" step="{{COORD_STEP}}" value="{{LONGITUDE}}">
        </div>
      </div>

      <div class="field">
        <label for="land_area">Land Area (hectares)</label>
        <input id="land_area" name="land_area" type="number" step="{{AREA_STEP}}" min="{{AREA_MIN}}" value="{{LAND_AREA}}">
      </div>

      <div class="field">
        <label for="yield_estimation_year">Yield Estimation Year</label>
        <input id="yield_estimation_year" name="yield_estimation_year" type="number" min="{{YEAR_MIN}}" max="{{YEAR_MAX}}" value="{{YEAR}}">
      </div>

      <button type="submit" id="submit" {{BUTTON_DISABLED}}>{{BUTTON_TEXT}}</button>
    </form>

    <!-- Gauge and results -->
    <section class="card">
      <h2>Financial Score</h2>
      <p class="desc">Agricultural viability assessment</p>
      <div class="gauge-wrap" id="gauge">{{GAUGE_SVG}}</div>
      <div class="interpretation">
        <h3 id="band-label">{{BAND_LABEL}}</h3>
        <p id="band-description">{{BAND_DESCRIPTION}}</p>
      </div>
    </section>
  </div>

  <!-- Status messages -->
  <div class="status">
    <div class="alert success {{SUCCESS_HIDDEN}}" id="alert-success">
      <strong>Success</strong>
      <span>{{SUCCESS_MESSAGE}}</span>
    </div>
    <div class="alert error {{ERROR_HIDDEN}}" id="alert-error">
      <strong>Error</strong>
      <span id="error-text">{{ERROR_TEXT}}</span>
    </div>
  </div>
</div>

<script>
const BOOT = {{BOOTSTRAP_JSON}};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let issued = 0;
let latest = 0;

const $ = id => document.getElementById(id);

function readForm() {
  return {
    region: $('region').value,
    latitude: $('latitude').value,
    longitude: $('longitude').value,
    land_area: parseFloat($('land_area').value),
    crop_type: $('crop_type').value,
    yield_estimation_year: $('yield_estimation_year').value,
  };
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------
function setLoading(loading) {
  const btn = $('submit');
  btn.disabled = loading;
  btn.innerHTML = loading
    ? '<span class="spinner"></span>Processing'
    : 'Calculate Agri Financial Score';
}

function showStatus(kind, message) {
  $('alert-success').classList.toggle('hidden', kind !== 'success');
  $('alert-error').classList.toggle('hidden', kind !== 'error');
  $('error-text').textContent = kind === 'error' ? message : '';
}

// Mirrors Band::for_percentage; NaN falls through to no_data
function bandFor(pct) {
  if (pct >= BOOT.excellent_threshold) return BOOT.bands.excellent;
  if (pct >= BOOT.moderate_threshold) return BOOT.bands.moderate;
  if (pct > 0) return BOOT.bands.limited;
  return BOOT.bands.no_data;
}

function showScore(raw) {
  const pct = raw / BOOT.max_score * 100;
  const band = bandFor(pct);
  const filled = Number.isFinite(pct)
    ? Math.min(Math.max(pct / 100 * BOOT.arc_length, 0), BOOT.arc_length)
    : 0;
  const shown = String(raw);

  const gauge = $('gauge');
  const fill = gauge.querySelector('.gauge-fill');
  fill.setAttribute('stroke', band.color);
  fill.setAttribute('stroke-dasharray', `${filled.toFixed(2)} ${BOOT.arc_length.toFixed(2)}`);
  gauge.querySelector('.gauge-value').textContent = shown;
  gauge.querySelector('svg').setAttribute('aria-label', 'Score ' + shown);

  $('band-label').textContent = band.label;
  $('band-description').textContent = band.description;
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------
async function submit(e) {
  e.preventDefault();
  const token = ++issued;
  latest = token;
  setLoading(true);
  showStatus('idle');

  try {
    const res = await fetch(BOOT.proxy_path, {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify(readForm()),
    });
    if (!res.ok) {
      throw new Error(`Server returned ${res.status}: ${res.statusText}`);
    }
    const data = await res.json();
    const raw = Number(data && data.agri_score) || 0;
    if (token !== latest) return;
    showScore(raw);
    showStatus('success');
  } catch (err) {
    if (token !== latest) return;
    showStatus('error', (err && err.message) || BOOT.fallback_message);
    showScore(0);
  } finally {
    if (token === latest) setLoading(false);
  }
}

$('score-form').addEventListener('submit', submit);
</script>
</body>
</html>"##;
