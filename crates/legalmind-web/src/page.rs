//! Single-page browser UI served at `/`
//!
//! Plain HTML and inline script over the JSON API; no build step.

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LegalMind - Contract Summaries</title>
    <style>
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: system-ui, -apple-system, sans-serif;
            background: #f5f5f5;
            color: #1a1a1a;
            padding: 2rem;
        }
        main { max-width: 960px; margin: 0 auto; }
        h1 { font-size: 1.8rem; margin-bottom: 1.5rem; }
        h2 { font-size: 1.2rem; margin: 1.5rem 0 0.75rem; }
        .card {
            background: white;
            padding: 1.5rem;
            border-radius: 8px;
            box-shadow: 0 2px 8px rgba(0,0,0,0.1);
            margin-bottom: 1.5rem;
        }
        textarea {
            width: 100%;
            min-height: 200px;
            padding: 0.75rem;
            font-family: inherit;
            border: 1px solid #ccc;
            border-radius: 4px;
        }
        button {
            margin-top: 0.75rem;
            padding: 0.5rem 1.25rem;
            background: #1a1a1a;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
        }
        button:disabled { opacity: 0.5; cursor: wait; }
        .metrics { display: flex; gap: 1.5rem; margin: 0.75rem 0; color: #555; font-size: 0.9rem; }
        .badge { padding: 0.1rem 0.5rem; border-radius: 4px; font-size: 0.8rem; }
        .hit { background: #d8f5d8; }
        .miss { background: #f5ead8; }
        .error { color: #b00020; }
        table { width: 100%; border-collapse: collapse; font-size: 0.9rem; }
        th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #eee; vertical-align: top; }
        code { font-family: monospace; background: #f0f0f0; padding: 0.1rem 0.3rem; border-radius: 3px; }
    </style>
</head>
<body>
<main>
    <h1>LegalMind</h1>

    <section class="card">
        <h2>Analyze contract</h2>
        <textarea id="text" placeholder="Paste contract text here"></textarea>
        <button id="analyze">Summarize</button>
        <div id="result"></div>
    </section>

    <section class="card">
        <h2>History <span id="stats" class="metrics"></span></h2>
        <table>
            <thead>
                <tr><th>Created</th><th>Fingerprint</th><th>Reduction</th><th>Summary</th></tr>
            </thead>
            <tbody id="history"></tbody>
        </table>
    </section>
</main>

<script>
    const escapeHtml = (s) => s.replace(/[&<>"']/g, (c) => ({
        '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;'
    }[c]));

    async function loadHistory() {
        const [records, stats] = await Promise.all([
            fetch('/api/summaries?limit=20').then((r) => r.json()),
            fetch('/api/stats').then((r) => r.json()),
        ]);
        document.getElementById('history').innerHTML = records.map((r) => `
            <tr>
                <td>${new Date(r.created_at).toLocaleString()}</td>
                <td><code>${r.fingerprint.slice(0, 12)}</code></td>
                <td>${(1 / Math.max(r.compression_ratio, 0.0001)).toFixed(1)}:1</td>
                <td>${escapeHtml(r.summary_text)}</td>
            </tr>`).join('');
        document.getElementById('stats').textContent =
            `${stats.total_records} records, avg ${Math.round(stats.avg_processing_ms)} ms`;
    }

    document.getElementById('analyze').addEventListener('click', async () => {
        const button = document.getElementById('analyze');
        const result = document.getElementById('result');
        button.disabled = true;
        try {
            const response = await fetch('/api/analyze', {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ text: document.getElementById('text').value }),
            });
            const body = await response.json();
            if (!response.ok) {
                result.innerHTML = `<p class="error">${escapeHtml(body.error)}</p>`;
                return;
            }
            const r = body.record;
            result.innerHTML = `
                <div class="metrics">
                    <span class="badge ${body.cache_hit ? 'hit' : 'miss'}">${body.cache_hit ? 'cached' : 'new'}</span>
                    <span>${r.original_length} → ${r.summary_length} chars</span>
                    <span>${(r.processing_time_ms / 1000).toFixed(2)} s</span>
                    <span>${escapeHtml(r.model)}</span>
                </div>
                <p>${escapeHtml(r.summary_text)}</p>`;
        } finally {
            button.disabled = false;
        }
    });

    const events = new EventSource('/api/events');
    events.addEventListener('analysis_stored', loadHistory);

    loadHistory();
</script>
</body>
</html>"#;
