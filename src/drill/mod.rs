// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod get;
mod post;
pub mod server;
mod state;
mod template;

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::Router;
    use axum::routing::get;
    use reqwest::StatusCode;
    use tempfile::TempDir;
    use tempfile::tempdir;
    use tokio::net::TcpListener;
    use tokio::net::TcpStream;
    use tokio::spawn;
    use tokio::time::sleep;

    use crate::collection::Collection;
    use crate::drill::server::start_server;
    use crate::error::Fallible;

    /// Start a server on a free port over a fresh data directory.
    async fn serve() -> Fallible<(TempDir, String)> {
        let dir = tempdir()?;
        let collection = Collection::open(Some(dir.path().display().to_string()))?;
        let port = portpicker::pick_unused_port().unwrap();
        spawn(async move { start_server(collection, port, false).await });
        let bind = format!("127.0.0.1:{port}");
        loop {
            if let Ok(stream) = TcpStream::connect(&bind).await {
                drop(stream);
                break;
            }
            sleep(Duration::from_millis(1)).await;
        }
        Ok((dir, format!("http://{bind}")))
    }

    /// Serve `text` at `/remote.deck` and return the deck's URL.
    async fn serve_deck(text: &'static str) -> Fallible<String> {
        let app = Router::new().route("/remote.deck", get(move || async move { text }));
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        spawn(async move { axum::serve(listener, app).await });
        Ok(format!("http://{addr}/remote.deck"))
    }

    async fn post(url: &str, form: &[(&str, &str)]) -> Fallible<String> {
        let response = reqwest::Client::new().post(url).form(form).send().await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        Ok(response.text().await?)
    }

    #[tokio::test]
    async fn test_static_routes() -> Fallible<()> {
        let (_dir, base) = serve().await?;

        let response = reqwest::get(format!("{base}/style.css")).await?;
        assert!(response.status().is_success());
        assert_eq!(response.headers().get("content-type").unwrap(), "text/css");

        let response = reqwest::get(format!("{base}/script.js")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/javascript"
        );

        let response = reqwest::get(format!("{base}/herp-derp")).await?;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_deck_page() -> Fallible<()> {
        let (_dir, base) = serve().await?;
        let response = reqwest::get(format!("{base}/")).await?;
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/html; charset=utf-8"
        );
        let html = response.text().await?;
        assert!(html.contains("No cards. Import a deck to start studying."));
        assert!(html.contains("<title>flashdeck</title>"));
        Ok(())
    }

    #[tokio::test]
    async fn test_e2e() -> Fallible<()> {
        let (_dir, base) = serve().await?;
        let root = format!("{base}/");

        // Import a one-card deck.
        let text = "**Deck: Basics\n*Spanish|English\nhola|hello\n";
        let html = post(&format!("{base}/import"), &[("text", text), ("url", "")]).await?;
        assert!(html.contains("<h1>Basics</h1>"));
        assert!(html.contains("<div class=\"text\">hola</div>"));
        assert!(html.contains("1 / 1"));
        assert!(!html.contains("<div class=\"text\">hello</div>"));

        // Flip.
        let html = post(&root, &[("action", "Flip")]).await?;
        assert!(html.contains("<div class=\"text\">hello</div>"));

        // Next wraps around to the same card, face down.
        let html = post(&root, &[("action", "Next")]).await?;
        assert!(html.contains("<div class=\"text\">hola</div>"));
        assert!(!html.contains("<div class=\"text\">hello</div>"));

        // Harder raises the frequency factor.
        let html = post(&root, &[("action", "Harder")]).await?;
        assert!(html.contains("title=\"Frequency factor\">+1</div>"));
        let html = post(&root, &[("action", "Easier")]).await?;
        assert!(html.contains("title=\"Frequency factor\">+0</div>"));

        // A failed import keeps the deck and shows the error.
        let html = post(
            &format!("{base}/import"),
            &[("text", "no cards here"), ("url", "")],
        )
        .await?;
        assert!(html.contains("error: deck contains no valid cards."));
        assert!(html.contains("<div class=\"text\">hola</div>"));

        // Replace the deck with two categories.
        let text = "*Spanish|English\nhola|hello\nadios|goodbye\n*German|English\ndanke|thanks\n";
        let html = post(&format!("{base}/import"), &[("text", text), ("url", "")]).await?;
        assert!(html.contains(" / 3"));
        assert!(html.contains("Spanish (2)"));
        assert!(html.contains("German (1)"));

        // Only German.
        let html = post(&format!("{base}/categories"), &[("category", "German")]).await?;
        assert!(html.contains("1 / 1"));
        assert!(html.contains("<div class=\"text\">danke</div>"));

        // Back to everything.
        let html = post(&root, &[("action", "SelectAll")]).await?;
        assert!(html.contains(" / 3"));

        // Search.
        let html = post(&format!("{base}/search"), &[("query", "GOOD")]).await?;
        assert!(html.contains("1 / 1"));
        assert!(html.contains("<div class=\"text\">adios</div>"));
        let html = post(&format!("{base}/search"), &[("query", "zzz")]).await?;
        assert!(html.contains("No matches found for: zzz"));

        // Settings: a session of two cards.
        let html = post(
            &format!("{base}/settings"),
            &[
                ("temperature", "2.0"),
                ("session_size", "2"),
                ("speech_rate", "1.0"),
                ("mode", "batch"),
            ],
        )
        .await?;
        assert!(html.contains(" / 2"));
        assert!(html.contains("value=\"2.0\""));

        // Streaming mode disables Previous.
        let html = post(
            &format!("{base}/settings"),
            &[
                ("temperature", "2.0"),
                ("session_size", "2"),
                ("speech_rate", "1.0"),
                ("mode", "streaming"),
            ],
        )
        .await?;
        assert!(html.contains("value=\"Previous\" disabled"));
        let html = post(&root, &[("action", "Draw")]).await?;
        assert!(html.contains(" / 2"));

        // Step the temperature down.
        let html = post(&root, &[("action", "Cooler")]).await?;
        assert!(html.contains("value=\"1.9\""));

        // Reset settings.
        let html = post(&root, &[("action", "ResetSettings")]).await?;
        assert!(html.contains(" / 3"));
        assert!(!html.contains("disabled"));
        Ok(())
    }

    #[tokio::test]
    async fn test_import_from_url() -> Fallible<()> {
        let (_dir, base) = serve().await?;
        let deck_url = serve_deck("**Deck: Remote\n*German|English\ndanke|thanks\n").await?;

        let form = [("text", ""), ("url", deck_url.as_str())];
        let html = post(&format!("{base}/import"), &form).await?;
        assert!(html.contains("<h1>Remote</h1>"));
        assert!(html.contains("<div class=\"text\">danke</div>"));
        assert!(html.contains("German (1)"));

        // A missing deck reports the fetch error and keeps the current deck.
        let missing = deck_url.replace("remote.deck", "missing.deck");
        let form = [("text", ""), ("url", missing.as_str())];
        let html = post(&format!("{base}/import"), &form).await?;
        assert!(html.contains("error: fetch failed"));
        assert!(html.contains("<div class=\"text\">danke</div>"));
        Ok(())
    }
}
