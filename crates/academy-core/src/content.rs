//! Classifying curriculum content references and choosing how to present
//! them.

use serde::{Deserialize, Serialize};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const WORD_EXTENSIONS: &[&str] = &["doc", "docx"];
const POWERPOINT_EXTENSIONS: &[&str] = &["ppt", "pptx"];
const EXCEL_EXTENSIONS: &[&str] = &["xls", "xlsx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
  Video,
  Pdf,
  Image,
  Word,
  PowerPoint,
  Excel,
  ExternalLink,
  Document,
}

/// How a client should present a content reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "renderer", rename_all = "snake_case")]
pub enum Renderer {
  EmbeddedVideo { embed_url: String },
  DocumentFrame { src: String },
  Image { src: String },
  Download { href: String },
  OpenExternally { href: String },
}

fn has_extension(url: &str, extensions: &[&str]) -> bool {
  let url = url.to_ascii_lowercase();
  extensions.iter().any(|ext| {
    url
      .strip_suffix(ext)
      .is_some_and(|rest| rest.ends_with('.'))
  })
}

fn is_hosted_video(url: &str) -> bool {
  ["youtube.com", "youtu.be", "vimeo.com"]
    .iter()
    .any(|host| url.contains(host))
}

impl ContentKind {
  /// Classify by media type first, then by URL. Earlier kinds win when
  /// several apply.
  pub fn classify(url: &str, media_type: Option<&str>) -> Self {
    let media_type = media_type.unwrap_or_default();
    if media_type.starts_with("video/")
      || has_extension(url, VIDEO_EXTENSIONS)
      || is_hosted_video(url)
    {
      Self::Video
    } else if media_type == "application/pdf" || has_extension(url, &["pdf"]) {
      Self::Pdf
    } else if media_type.starts_with("image/") || has_extension(url, IMAGE_EXTENSIONS) {
      Self::Image
    } else if has_extension(url, WORD_EXTENSIONS) {
      Self::Word
    } else if has_extension(url, POWERPOINT_EXTENSIONS) {
      Self::PowerPoint
    } else if has_extension(url, EXCEL_EXTENSIONS) {
      Self::Excel
    } else if url.starts_with("http") {
      Self::ExternalLink
    } else {
      Self::Document
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Self::Video => "Video Content",
      Self::Pdf => "PDF Document",
      Self::Image => "Image Content",
      Self::Word => "Word Document",
      Self::PowerPoint => "PowerPoint Presentation",
      Self::Excel => "Excel Spreadsheet",
      Self::ExternalLink => "External Resource",
      Self::Document => "Document",
    }
  }

  pub fn renderer(self, url: &str) -> Renderer {
    match self {
      Self::Video => Renderer::EmbeddedVideo { embed_url: video_embed_url(url) },
      Self::Pdf => Renderer::DocumentFrame { src: format!("{url}#toolbar=0&navpanes=0") },
      Self::Image => Renderer::Image { src: url.to_owned() },
      Self::ExternalLink => Renderer::OpenExternally { href: url.to_owned() },
      Self::Word | Self::PowerPoint | Self::Excel | Self::Document => {
        Renderer::Download { href: url.to_owned() }
      }
    }
  }
}

/// Player URL for hosted videos; files play from their own URL.
fn video_embed_url(url: &str) -> String {
  if url.contains("youtube.com") || url.contains("youtu.be") {
    url.replace("watch?v=", "embed/")
  } else if url.contains("vimeo.com") {
    let id = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    format!("https://player.vimeo.com/video/{id}")
  } else {
    url.to_owned()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classification_by_extension() {
    let cases = [
      ("/curriculum/html-intro.pdf", ContentKind::Pdf),
      ("/media/intro.MP4", ContentKind::Video),
      ("/img/diagram.webp", ContentKind::Image),
      ("/docs/notes.docx", ContentKind::Word),
      ("/docs/slides.ppt", ContentKind::PowerPoint),
      ("/docs/grades.xlsx", ContentKind::Excel),
      ("https://developer.mozilla.org/en-US/docs/Web/HTML", ContentKind::ExternalLink),
      ("blob:1234", ContentKind::Document),
    ];
    for (url, expected) in cases {
      assert_eq!(ContentKind::classify(url, None), expected, "{url}");
    }
  }

  #[test]
  fn media_type_takes_precedence() {
    assert_eq!(ContentKind::classify("blob:abc", Some("video/webm")), ContentKind::Video);
    assert_eq!(
      ContentKind::classify("blob:abc", Some("application/pdf")),
      ContentKind::Pdf
    );
    assert_eq!(ContentKind::classify("blob:abc", Some("image/png")), ContentKind::Image);
  }

  #[test]
  fn hosted_video_beats_external_link() {
    let url = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";
    assert_eq!(ContentKind::classify(url, None), ContentKind::Video);
    assert_eq!(
      ContentKind::Video.renderer(url),
      Renderer::EmbeddedVideo { embed_url: "https://www.youtube.com/embed/dQw4w9WgXcQ".into() }
    );
  }

  #[test]
  fn vimeo_uses_the_player_url() {
    let url = "https://vimeo.com/76979871";
    let kind = ContentKind::classify(url, None);
    assert_eq!(
      kind.renderer(url),
      Renderer::EmbeddedVideo { embed_url: "https://player.vimeo.com/video/76979871".into() }
    );
  }

  #[test]
  fn pdf_frame_hides_the_toolbar() {
    assert_eq!(
      ContentKind::Pdf.renderer("/a.pdf"),
      Renderer::DocumentFrame { src: "/a.pdf#toolbar=0&navpanes=0".into() }
    );
  }

  #[test]
  fn office_documents_download() {
    assert!(matches!(
      ContentKind::Excel.renderer("/grades.xls"),
      Renderer::Download { .. }
    ));
    assert_eq!(ContentKind::Excel.label(), "Excel Spreadsheet");
  }

  #[test]
  fn extension_must_follow_a_dot() {
    assert_eq!(ContentKind::classify("/files/mypdf", None), ContentKind::Document);
  }
}
