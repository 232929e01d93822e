use crate::models::{Medication, TodayResponse};

pub fn render_index(today: &TodayResponse) -> String {
    // Doses go in last so user text is never scanned for placeholders.
    INDEX_HTML
        .replace("{{DATE}}", &today.date)
        .replace("{{TAKEN}}", &today.taken_count.to_string())
        .replace("{{TOTAL}}", &today.total_count.to_string())
        .replace("{{RATE}}", &today.completion_rate.to_string())
        .replace("{{DOSES}}", &render_doses(&today.medications))
}

/// Dose cards with a plain form post per dose, so toggling works without scripts.
fn render_doses(medications: &[Medication]) -> String {
    medications
        .iter()
        .map(|med| {
            let (state, button, label) = if med.taken {
                (" taken", "outline", "Undo")
            } else {
                ("", "", "Taken")
            };
            let notes = med
                .notes
                .as_deref()
                .map(|notes| format!(r#"<div class="notes">{}</div>"#, escape_html(notes)))
                .unwrap_or_default();

            format!(
                r#"<div class="card dose{state}"><div><span class="badge {color}">{time}</span><h3>{name}</h3><div class="subtitle">{dosage}</div>{notes}</div><form method="post" action="/medications/{id}/toggle"><button class="{button}" type="submit">{label}</button></form></div>"#,
                color = escape_html(&med.color),
                time = escape_html(&med.time),
                name = escape_html(&med.name),
                dosage = escape_html(&med.dosage),
                id = med.id,
            )
        })
        .collect()
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Medication Tracker</title>
  <style>
    :root {
      --bg-1: #f5f3ff;
      --bg-2: #eff6ff;
      --ink: #1f2937;
      --muted: #6b7280;
      --primary: #7c3aed;
      --success: #16a34a;
      --warn: #ea580c;
      --card: rgba(255, 255, 255, 0.9);
      --shadow: 0 20px 50px rgba(76, 29, 149, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), var(--bg-2) 55%, #fdf2f8 100%);
      color: var(--ink);
      font-family: system-ui, "Segoe UI", sans-serif;
      padding: 28px 16px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 24px;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      justify-content: space-between;
      align-items: center;
      gap: 16px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.8rem, 4vw, 2.5rem);
      color: var(--primary);
    }

    .subtitle {
      margin: 4px 0 0;
      color: var(--muted);
    }

    .card {
      background: var(--card);
      border-radius: 20px;
      box-shadow: var(--shadow);
      padding: 22px;
    }

    .progress-head {
      display: flex;
      justify-content: space-between;
      align-items: end;
      margin-bottom: 14px;
    }

    .big {
      font-size: 2rem;
      font-weight: 700;
      color: var(--primary);
    }

    .bar {
      height: 12px;
      border-radius: 999px;
      background: #ede9fe;
      overflow: hidden;
    }

    .bar > div {
      height: 100%;
      background: var(--primary);
      transition: width 250ms ease;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 12px;
      padding: 12px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      background: var(--primary);
      color: white;
    }

    button.outline {
      background: white;
      color: var(--ink);
      border: 1px solid #d1d5db;
    }

    .tabs {
      display: grid;
      grid-template-columns: repeat(4, 1fr);
      gap: 6px;
      padding: 6px;
      background: #ede9fe;
      border-radius: 14px;
    }

    .tab {
      background: transparent;
      color: var(--muted);
    }

    .tab.active {
      background: white;
      color: var(--primary);
    }

    .panel[hidden] {
      display: none;
    }

    .list {
      display: grid;
      gap: 14px;
    }

    .dose {
      display: flex;
      justify-content: space-between;
      align-items: flex-start;
      gap: 12px;
    }

    .dose.taken {
      border: 2px solid rgba(22, 163, 74, 0.3);
    }

    .dose.taken h3 {
      text-decoration: line-through;
      color: var(--muted);
    }

    .dose h3 {
      margin: 6px 0;
    }

    .badge {
      display: inline-block;
      padding: 3px 10px;
      border-radius: 999px;
      font-size: 0.8rem;
      font-weight: 600;
      background: #ede9fe;
      color: var(--primary);
    }

    .badge.purple { background: #f3e8ff; color: #7e22ce; }
    .badge.blue { background: #dbeafe; color: #1d4ed8; }
    .badge.amber { background: #fef3c7; color: #b45309; }
    .badge.green { background: #dcfce7; color: #15803d; }
    .badge.pink { background: #fce7f3; color: #be185d; }
    .badge.teal { background: #ccfbf1; color: #0f766e; }

    .notes {
      margin-top: 8px;
      font-size: 0.9rem;
      color: var(--muted);
      background: #f9fafb;
      padding: 10px;
      border-radius: 10px;
    }

    .week {
      display: grid;
      grid-template-columns: repeat(7, 1fr);
      gap: 10px;
      margin-bottom: 20px;
    }

    .day {
      text-align: center;
      padding: 12px 4px;
      border-radius: 14px;
      background: #f3f4f6;
    }

    .day.today {
      background: var(--primary);
      color: white;
    }

    .day .num {
      font-size: 1.5rem;
      font-weight: 700;
    }

    .day .pct.mock {
      opacity: 0.6;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 12px;
      text-align: center;
    }

    .stats .value {
      font-size: 1.8rem;
      font-weight: 700;
    }

    .status-taken { color: var(--success); }
    .status-missed { color: var(--warn); }
    .status-skipped { color: var(--muted); }

    .history-group h3 {
      margin: 8px 0;
      font-size: 1rem;
      color: var(--muted);
    }

    .history-row {
      display: flex;
      justify-content: space-between;
      padding: 8px 0;
      border-bottom: 1px solid #f3f4f6;
    }

    dialog {
      border: none;
      border-radius: 18px;
      width: min(460px, 92vw);
      box-shadow: var(--shadow);
    }

    dialog form {
      display: grid;
      gap: 12px;
    }

    label {
      display: grid;
      gap: 4px;
      font-size: 0.9rem;
      font-weight: 600;
    }

    input, select, textarea {
      font: inherit;
      padding: 8px 10px;
      border: 1px solid #d1d5db;
      border-radius: 10px;
    }

    .row {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    .toast {
      position: fixed;
      right: 20px;
      bottom: 20px;
      background: white;
      border-left: 4px solid var(--success);
      box-shadow: var(--shadow);
      border-radius: 12px;
      padding: 12px 16px;
      min-width: 220px;
      opacity: 0;
      transform: translateY(12px);
      transition: opacity 200ms ease, transform 200ms ease;
      pointer-events: none;
    }

    .toast.show {
      opacity: 1;
      transform: translateY(0);
    }

    .toast[data-type="error"] {
      border-left-color: #dc2626;
    }

    .toast p {
      margin: 4px 0 0;
      color: var(--muted);
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <div>
        <h1>Medication Tracker</h1>
        <p class="subtitle">Today is <span id="date">{{DATE}}</span></p>
      </div>
      <button id="open-add" type="button">+ Add medication</button>
    </header>

    <section class="card">
      <div class="progress-head">
        <div>
          <div class="subtitle">Today's progress</div>
          <div class="big"><span id="taken">{{TAKEN}}</span> of <span id="total">{{TOTAL}}</span></div>
        </div>
        <div class="big"><span id="rate">{{RATE}}</span>%</div>
      </div>
      <div class="bar"><div id="rate-bar" style="width: {{RATE}}%"></div></div>
    </section>

    <nav class="tabs" role="tablist">
      <button class="tab active" type="button" data-tab="today" role="tab" aria-selected="true">Reminders</button>
      <button class="tab" type="button" data-tab="calendar" role="tab" aria-selected="false">Calendar</button>
      <button class="tab" type="button" data-tab="medications" role="tab" aria-selected="false">Medications</button>
      <button class="tab" type="button" data-tab="history" role="tab" aria-selected="false">History</button>
    </nav>

    <section class="panel list" id="panel-today">{{DOSES}}</section>

    <section class="panel card" id="panel-calendar" hidden>
      <h2>Weekly schedule</h2>
      <div class="week" id="week"></div>
      <h3>This week</h3>
      <div class="stats">
        <div><div class="value status-taken" id="week-rate">0%</div><div class="subtitle">Completion</div></div>
        <div><div class="value" id="week-taken">0</div><div class="subtitle">Taken</div></div>
        <div><div class="value status-missed" id="week-missed">0</div><div class="subtitle">Missed</div></div>
      </div>
    </section>

    <section class="panel list" id="panel-medications" hidden></section>

    <section class="panel card" id="panel-history" hidden>
      <div class="stats">
        <div><div class="value status-taken" id="hist-taken">0</div><div class="subtitle">Taken</div></div>
        <div><div class="value status-missed" id="hist-missed">0</div><div class="subtitle">Missed</div></div>
        <div><div class="value status-skipped" id="hist-skipped">0</div><div class="subtitle">Skipped</div></div>
      </div>
      <div id="history"></div>
    </section>
  </main>

  <dialog id="add-dialog">
    <form id="add-form" method="dialog">
      <h2>New medication</h2>
      <label>Name<input name="name" placeholder="e.g. Aspirin" required /></label>
      <div class="row">
        <label>Dosage<input name="dosage" placeholder="100 mg" /></label>
        <label>Time<input name="time" type="time" required /></label>
      </div>
      <label>Frequency
        <select name="frequency">
          <option value="daily">Daily</option>
          <option value="weekly">Weekly</option>
          <option value="custom">Custom schedule</option>
        </select>
      </label>
      <label>Notes<textarea name="notes" placeholder="Take after meals, with water..."></textarea></label>
      <div class="row">
        <button class="outline" type="button" id="cancel-add">Cancel</button>
        <button type="submit">Save</button>
      </div>
    </form>
  </dialog>

  <div class="toast" id="toast"><strong id="toast-title"></strong><p id="toast-detail"></p></div>

  <script>
    const FREQUENCY_LABELS = { daily: 'Daily', weekly: 'Weekly', custom: 'Custom schedule' };
    const tabs = Array.from(document.querySelectorAll('.tab'));
    const toastEl = document.getElementById('toast');
    let toastTimer = null;

    const el = (tag, className, text) => {
      const node = document.createElement(tag);
      if (className) node.className = className;
      if (text !== undefined) node.textContent = text;
      return node;
    };

    const notify = (title, detail, type) => {
      document.getElementById('toast-title').textContent = title;
      document.getElementById('toast-detail').textContent = detail || '';
      toastEl.dataset.type = type || 'ok';
      toastEl.classList.add('show');
      clearTimeout(toastTimer);
      toastTimer = setTimeout(() => toastEl.classList.remove('show'), 2500);
    };

    const fail = (err) => notify('Something went wrong', err.message, 'error');

    const getJson = async (url, options) => {
      const res = await fetch(url, options);
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      return res.json();
    };

    const renderProgress = (today) => {
      document.getElementById('date').textContent = today.date;
      document.getElementById('taken').textContent = today.taken_count;
      document.getElementById('total').textContent = today.total_count;
      document.getElementById('rate').textContent = today.completion_rate;
      document.getElementById('rate-bar').style.width = `${today.completion_rate}%`;
    };

    const renderToday = (today) => {
      const panel = document.getElementById('panel-today');
      panel.replaceChildren();
      today.medications.forEach((med) => {
        const card = el('div', `card dose${med.taken ? ' taken' : ''}`);
        const info = el('div');
        info.append(el('span', `badge ${med.color}`, med.time));
        info.append(el('h3', '', med.name));
        info.append(el('div', 'subtitle', med.dosage));
        if (med.notes) info.append(el('div', 'notes', med.notes));
        const button = el('button', med.taken ? 'outline' : '', med.taken ? 'Undo' : 'Taken');
        button.type = 'button';
        button.addEventListener('click', () => toggle(med.id).catch(fail));
        card.append(info, button);
        panel.append(card);
      });
    };

    const renderMedications = (medications) => {
      const panel = document.getElementById('panel-medications');
      panel.replaceChildren();
      medications.forEach((med) => {
        const card = el('div', 'card');
        card.append(el('h3', '', med.name));
        const frequency = FREQUENCY_LABELS[med.frequency] || med.frequency;
        card.append(el('div', 'subtitle', `${med.dosage} - ${frequency} at ${med.time}`));
        if (med.notes) card.append(el('div', 'notes', med.notes));
        panel.append(card);
      });
    };

    const renderCalendar = (calendar) => {
      const week = document.getElementById('week');
      week.replaceChildren();
      calendar.days.forEach((day) => {
        const cell = el('div', `day${day.is_today ? ' today' : ''}`);
        cell.append(el('div', 'subtitle', day.weekday));
        cell.append(el('div', 'num', day.day_of_month));
        const pct = day.completion === 100 ? 'Done' : `${day.completion}%`;
        cell.append(el('div', `pct${day.placeholder ? ' mock' : ''}`, pct));
        week.append(cell);
      });
      document.getElementById('week-rate').textContent = `${calendar.week.completion_rate}%`;
      document.getElementById('week-taken').textContent = calendar.week.totals.taken;
      document.getElementById('week-missed').textContent = calendar.week.totals.missed;
    };

    const renderHistory = (history) => {
      document.getElementById('hist-taken').textContent = history.totals.taken;
      document.getElementById('hist-missed').textContent = history.totals.missed;
      document.getElementById('hist-skipped').textContent = history.totals.skipped;
      const container = document.getElementById('history');
      container.replaceChildren();
      history.groups.forEach((group) => {
        const section = el('div', 'history-group');
        section.append(el('h3', '', group.label));
        group.entries.forEach((entry) => {
          const row = el('div', 'history-row');
          row.append(el('span', '', `${entry.time}  ${entry.medication_name} ${entry.dosage}`));
          row.append(el('span', `status-${entry.status}`, entry.status));
          section.append(row);
        });
        container.append(section);
      });
    };

    const loadToday = async () => {
      const today = await getJson('/api/today');
      renderProgress(today);
      renderToday(today);
      renderMedications(today.medications);
    };

    const loadCalendar = async () => renderCalendar(await getJson('/api/calendar'));
    const loadHistory = async () => renderHistory(await getJson('/api/history'));

    const toggle = async (id) => {
      const result = await getJson(`/api/medications/${id}/toggle`, { method: 'POST' });
      renderProgress(result.today);
      renderToday(result.today);
      if (result.notification) {
        notify(result.notification.title, result.notification.detail);
      }
      await Promise.all([loadCalendar(), loadHistory()]);
    };

    const setActiveTab = (tab) => {
      tabs.forEach((button) => {
        const isActive = button.dataset.tab === tab;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
        document.getElementById(`panel-${button.dataset.tab}`).hidden = !isActive;
      });
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActiveTab(button.dataset.tab));
    });

    const dialog = document.getElementById('add-dialog');
    const addForm = document.getElementById('add-form');
    document.getElementById('open-add').addEventListener('click', () => dialog.showModal());
    document.getElementById('cancel-add').addEventListener('click', () => dialog.close());

    addForm.addEventListener('submit', (event) => {
      event.preventDefault();
      const data = new FormData(addForm);
      const body = {
        name: data.get('name'),
        dosage: data.get('dosage'),
        time: data.get('time'),
        frequency: data.get('frequency'),
        notes: data.get('notes') || null
      };
      getJson('/api/medications', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(body)
      })
        .then((result) => {
          notify(result.notification.title, result.notification.detail);
          dialog.close();
          addForm.reset();
          return Promise.all([loadToday(), loadCalendar()]);
        })
        .catch(fail);
    });

    Promise.all([loadToday(), loadCalendar(), loadHistory()]).catch(fail);
  </script>
</body>
</html>
"#;
