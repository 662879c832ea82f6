// src/handlers/ui.rs
use axum::{response::Html, routing::get, Router};

pub fn ui_routes() -> Router {
    Router::new()
        .route("/", get(chat_page))
        .route("/chat", get(chat_page)) // Alternative route
}

pub async fn chat_page() -> Html<String> {
    let html = r###"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>🏙️ CityScout - Discover Your City</title>
    <style>
        * {
            margin: 0;
            padding: 0;
            box-sizing: border-box;
        }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, Oxygen, Ubuntu, Cantarell, sans-serif;
            line-height: 1.6;
            color: #e8e8e8;
            background: linear-gradient(135deg, #1a1a2e 0%, #16213e 50%, #0f1419 100%);
            background-attachment: fixed;
            min-height: 100vh;
        }

        .container {
            max-width: 900px;
            margin: 0 auto;
            padding: 0 20px;
            display: flex;
            flex-direction: column;
            min-height: 100vh;
        }

        /* Welcome screen */
        .welcome {
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
            text-align: center;
            min-height: 100vh;
        }

        .welcome h1 {
            font-size: 2.6rem;
            margin-bottom: 1rem;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            -webkit-background-clip: text;
            -webkit-text-fill-color: transparent;
        }

        .welcome p {
            color: #a0aec0;
            max-width: 480px;
            margin-bottom: 2rem;
        }

        .start-btn {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            border: none;
            padding: 0.9rem 2.5rem;
            border-radius: 30px;
            font-size: 1.1rem;
            cursor: pointer;
        }

        .start-btn:hover {
            opacity: 0.9;
        }

        /* Chat area */
        .chat {
            display: none;
            flex-direction: column;
            flex: 1;
            padding-top: 1.5rem;
        }

        .messages {
            flex: 1;
            overflow-y: auto;
            padding-bottom: 1rem;
        }

        .message {
            max-width: 75%;
            margin: 0.5rem 0;
            padding: 0.75rem 1rem;
            border-radius: 14px;
            white-space: pre-wrap;
        }

        .message.user {
            background: #667eea;
            color: white;
            margin-left: auto;
        }

        .message.assistant {
            background: rgba(255, 255, 255, 0.08);
            border: 1px solid rgba(59, 130, 246, 0.3);
        }

        .card-grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
            gap: 1rem;
            margin: 0.75rem 0;
        }

        .card {
            background: rgba(26, 26, 46, 0.9);
            border: 1px solid rgba(59, 130, 246, 0.3);
            border-radius: 10px;
            overflow: hidden;
            cursor: pointer;
            transition: transform 0.15s ease;
        }

        .card:hover {
            transform: translateY(-3px);
        }

        .card img {
            width: 100%;
            height: 130px;
            object-fit: cover;
            background: #0f1419;
        }

        .card-body {
            padding: 0.75rem;
        }

        .card-body h3 {
            font-size: 1rem;
            margin-bottom: 0.25rem;
        }

        .card-body .meta {
            font-size: 0.85rem;
            color: #a0aec0;
        }

        .card-body .price {
            color: #68d391;
            font-weight: bold;
        }

        .tag {
            display: inline-block;
            background: rgba(102, 126, 234, 0.25);
            border-radius: 10px;
            padding: 0 0.5rem;
            font-size: 0.75rem;
            margin-right: 0.25rem;
        }

        .composer {
            display: flex;
            gap: 0.5rem;
            padding: 1rem 0 1.5rem;
        }

        .composer input {
            flex: 1;
            padding: 0.75rem 1rem;
            border-radius: 25px;
            border: 1px solid rgba(59, 130, 246, 0.4);
            background: rgba(255, 255, 255, 0.06);
            color: #e8e8e8;
            font-size: 1rem;
            outline: none;
        }

        .composer button {
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            color: white;
            border: none;
            border-radius: 25px;
            padding: 0 1.5rem;
            cursor: pointer;
        }

        .composer button:disabled {
            opacity: 0.5;
            cursor: default;
        }

        /* Detail dialog */
        .overlay {
            display: none;
            position: fixed;
            inset: 0;
            background: rgba(0, 0, 0, 0.6);
            align-items: center;
            justify-content: center;
            z-index: 1000;
        }

        .dialog {
            background: #16213e;
            border: 1px solid rgba(59, 130, 246, 0.4);
            border-radius: 12px;
            max-width: 520px;
            width: 90%;
            max-height: 85vh;
            overflow-y: auto;
            padding: 1.5rem;
        }

        .dialog img {
            width: 100%;
            border-radius: 8px;
            margin-bottom: 1rem;
        }

        .dialog h2 {
            margin-bottom: 0.5rem;
        }

        .dialog .close {
            float: right;
            background: none;
            border: none;
            color: #a0aec0;
            font-size: 1.4rem;
            cursor: pointer;
        }
    </style>
</head>
<body>
    <div class="container">
        <div class="welcome" id="welcome">
            <h1>🏙️ CityScout</h1>
            <p>Your guide to events and attractions around the city. Ask about concerts, museums, markets, nightlife - anything happening near you.</p>
            <button class="start-btn" onclick="startChat()">Start exploring</button>
        </div>

        <div class="chat" id="chat">
            <div class="messages" id="messages"></div>
            <div class="composer">
                <input id="input" type="text" placeholder="Ask about events and places..."
                       onkeydown="if (event.key === 'Enter') sendMessage()">
                <button id="send" onclick="sendMessage()">Send</button>
            </div>
        </div>
    </div>

    <div class="overlay" id="overlay" onclick="if (event.target === this) closeDetail()">
        <div class="dialog" id="dialog"></div>
    </div>

    <script>
        let sessionId = null;
        let loading = false;

        function priceLabel(price) {
            if (price === '0' || price === 'free') return 'Free';
            return price;
        }

        async function startChat() {
            const res = await fetch('/api/chat/session', { method: 'POST' });
            const session = await res.json();
            sessionId = session.session_id;
            document.getElementById('welcome').style.display = 'none';
            document.getElementById('chat').style.display = 'flex';
            renderTranscript(session.transcript);
            document.getElementById('input').focus();
        }

        async function sendMessage() {
            const input = document.getElementById('input');
            const text = input.value;
            if (loading || !text.trim()) return;

            loading = true;
            document.getElementById('send').disabled = true;
            input.value = '';

            try {
                const res = await fetch(`/api/chat/session/${sessionId}/message`, {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ text })
                });
                const body = await res.json();
                if (body.session) renderTranscript(body.session.transcript);
            } finally {
                loading = false;
                document.getElementById('send').disabled = false;
                input.focus();
            }
        }

        function renderTranscript(transcript) {
            const container = document.getElementById('messages');
            container.innerHTML = '';
            let lastResults = null;

            for (const msg of transcript) {
                if (msg.kind === 'results') {
                    const grid = document.createElement('div');
                    grid.className = 'card-grid';
                    (msg.payload || []).forEach((item, index) => {
                        grid.appendChild(renderCard(item, index));
                    });
                    container.appendChild(grid);
                    lastResults = grid;
                } else {
                    const div = document.createElement('div');
                    div.className = `message ${msg.kind}`;
                    div.textContent = msg.text;
                    container.appendChild(div);
                }
            }

            // scroll to the start of the latest results, otherwise to the newest message
            if (lastResults) {
                lastResults.scrollIntoView({ behavior: 'smooth', block: 'start' });
            } else if (container.lastChild) {
                container.lastChild.scrollIntoView({ behavior: 'smooth', block: 'end' });
            }
        }

        function renderCard(item, index) {
            const card = document.createElement('div');
            card.className = 'card';
            card.onclick = () => openDetail(item, index);

            const img = document.createElement('img');
            if (item.imageUrl) img.src = item.imageUrl;
            img.alt = item.title;
            card.appendChild(img);

            const body = document.createElement('div');
            body.className = 'card-body';

            const title = document.createElement('h3');
            title.textContent = (item.isFavorite ? '⭐ ' : '') + item.title;
            body.appendChild(title);

            const meta = document.createElement('div');
            meta.className = 'meta';
            meta.textContent = [item.address, item.city].filter(Boolean).join(', ');
            body.appendChild(meta);

            if (item.price != null) {
                const price = document.createElement('div');
                price.className = 'price';
                price.textContent = priceLabel(item.price);
                body.appendChild(price);
            }

            card.appendChild(body);
            return card;
        }

        async function openDetail(item, index) {
            await fetch(`/api/chat/session/${sessionId}/select`, {
                method: 'POST',
                headers: { 'Content-Type': 'application/json' },
                body: JSON.stringify({ index })
            });

            const dialog = document.getElementById('dialog');
            dialog.innerHTML = '';

            const close = document.createElement('button');
            close.className = 'close';
            close.textContent = '✕';
            close.onclick = closeDetail;
            dialog.appendChild(close);

            if (item.imageUrl) {
                const img = document.createElement('img');
                img.src = item.imageUrl;
                img.alt = item.title;
                dialog.appendChild(img);
            }

            const title = document.createElement('h2');
            title.textContent = item.title;
            dialog.appendChild(title);

            const meta = document.createElement('p');
            meta.className = 'meta';
            meta.textContent = [item.address, item.city].filter(Boolean).join(', ');
            dialog.appendChild(meta);

            if (item.startsAt) {
                const when = document.createElement('p');
                when.textContent = `🗓️ ${item.startsAt}` + (item.endsAt ? ` - ${item.endsAt}` : '');
                dialog.appendChild(when);
            }

            if (item.price != null) {
                const price = document.createElement('p');
                price.className = 'price';
                // always the selected item's own price
                price.textContent = `💰 ${priceLabel(item.price)}`;
                dialog.appendChild(price);
            }

            if (item.tags && item.tags.length) {
                const tags = document.createElement('p');
                for (const t of item.tags) {
                    const span = document.createElement('span');
                    span.className = 'tag';
                    span.textContent = t;
                    tags.appendChild(span);
                }
                dialog.appendChild(tags);
            }

            if (item.description) {
                const desc = document.createElement('p');
                desc.textContent = item.description;
                dialog.appendChild(desc);
            }

            if (item.phone) {
                const phone = document.createElement('p');
                phone.textContent = `📞 ${item.phone}`;
                dialog.appendChild(phone);
            }

            if (item.website) {
                const site = document.createElement('p');
                const link = document.createElement('a');
                link.href = item.website;
                link.textContent = item.website;
                link.target = '_blank';
                site.appendChild(link);
                dialog.appendChild(site);
            }

            document.getElementById('overlay').style.display = 'flex';
        }

        async function closeDetail() {
            document.getElementById('overlay').style.display = 'none';
            await fetch(`/api/chat/session/${sessionId}/select`, { method: 'DELETE' });
        }
    </script>
</body>
</html>
    "###;

    Html(html.to_string())
}
