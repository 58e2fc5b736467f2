//! Render pipeline: session input + stage → finished HTML.

use chrono::{DateTime, Utc};

use crate::calendar::Invite;
use crate::error::RenderError;
use crate::scenes::SceneLibrary;
use crate::session::{self, SessionInput};
use crate::stage::{Stage, StageCursor};
use crate::template::{self, Context, Template};

const BUNDLE: &str = r#"<!doctype html>
<html><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>A Valentine for {{RECIPIENT}}</title>
<style>
:root{--accent:{{ACCENT|css}};--bg:#071024}
html,body{height:100%;margin:0;background:var(--bg);font-family:Inter,Arial,sans-serif;color:#fff}
.shell{display:flex;flex-direction:column;height:100%}
.scene{flex:1;width:100%;border:0;display:none}
.scene.active{display:block}
.nav{display:flex;justify-content:space-between;align-items:center;padding:10px 16px;background:rgba(255,255,255,0.03)}
.nav button{padding:8px 14px;border-radius:10px;border:none;background:var(--accent);color:var(--bg);font-weight:800;cursor:pointer}
.nav button:disabled{opacity:0.4;cursor:default}
</style></head><body>
<div class="shell">
{{FRAMES|raw}}
<div class="nav">
  <button id="back">Back</button>
  <span id="where"></span>
  <button id="next">Next</button>
</div>
</div>
<script>
const scenes = Array.from(document.querySelectorAll('.scene'));
const back = document.getElementById('back');
const next = document.getElementById('next');
const where = document.getElementById('where');
let at = 0;
function show(i) {
  at = Math.max(0, Math.min(scenes.length - 1, i));
  scenes.forEach((s, n) => s.classList.toggle('active', n === at));
  back.disabled = at === 0;
  next.disabled = at === scenes.length - 1;
  where.textContent = (at + 1) + ' / ' + scenes.length + ' · ' + scenes[at].dataset.stage;
}
back.addEventListener('click', () => show(at - 1));
next.addEventListener('click', () => show(at + 1));
show(0);
</script>
</body></html>
"#;

/// One rendered stage plus the invite it embeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub stage: Stage,
    pub html: String,
    pub invite: Invite,
}

/// Renders stage templates for a session.
#[derive(Debug, Clone)]
pub struct Renderer {
    scenes: SceneLibrary,
}

impl Renderer {
    #[must_use]
    pub fn new(scenes: SceneLibrary) -> Self {
        Self { scenes }
    }

    #[must_use]
    pub fn scenes(&self) -> &SceneLibrary {
        &self.scenes
    }

    /// Render the stage under `cursor`.
    ///
    /// `background` is the image URI for the vault backdrop. `now` stamps
    /// the calendar invite.
    ///
    /// # Errors
    ///
    /// - [`RenderError::Scene`] if the stage template cannot be loaded.
    /// - [`RenderError::Template`] if it fails to parse or has a placeholder
    ///   with no value.
    pub async fn render(
        &self,
        input: &SessionInput,
        cursor: StageCursor,
        background: &str,
        now: DateTime<Utc>,
    ) -> Result<RenderedPage, RenderError> {
        let stage = cursor.stage();
        let invite = input.invite_at(now);
        let ctx = session::context_for(input, &invite, background);
        let html = self.render_with(stage, &ctx).await?;

        tracing::debug!(stage = %stage, bytes = html.len(), "rendered stage");
        Ok(RenderedPage {
            stage,
            html,
            invite,
        })
    }

    /// Render all four stages into one self-contained document.
    ///
    /// Each stage sits in an `<iframe srcdoc>` with Back/Next controls.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render), for whichever stage fails first.
    pub async fn render_bundle(
        &self,
        input: &SessionInput,
        background: &str,
        now: DateTime<Utc>,
    ) -> Result<String, RenderError> {
        let invite = input.invite_at(now);
        let ctx = session::context_for(input, &invite, background);

        let mut frames = String::new();
        for stage in Stage::ALL {
            let html = self.render_with(stage, &ctx).await?;
            frames.push_str(&format!(
                "<iframe class=\"scene\" data-stage=\"{stage}\" title=\"{stage}\" srcdoc=\"{}\"></iframe>\n",
                template::escape_html(&html)
            ));
        }

        let shell = Context::new()
            .with("RECIPIENT", input.recipient())
            .with("ACCENT", input.accent().as_str())
            .with("FRAMES", frames);
        let bundle = Template::parse(BUNDLE)
            .and_then(|t| t.render(&shell))
            .map_err(|source| RenderError::Template {
                stage: "bundle".to_owned(),
                source,
            })?;

        tracing::debug!(bytes = bundle.len(), "rendered bundle");
        Ok(bundle)
    }

    async fn render_with(&self, stage: Stage, ctx: &Context) -> Result<String, RenderError> {
        let source = self.scenes.load(stage).await?;
        Template::parse(&source)
            .and_then(|t| t.render(ctx))
            .map_err(|source| RenderError::Template {
                stage: stage.as_str().to_owned(),
                source,
            })
    }
}
