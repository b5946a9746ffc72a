//! Output languages and the localized strings the library and CLI show.
//!
//! Three languages are supported: French (the default), English and
//! Arabic. The model is always instructed with the language's English name
//! ([`Language::prompt_name`]); user-facing text comes from
//! [`Language::messages`].

use crate::error::MindMapError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Target language for generated content and user messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
    Ar,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::Fr, Language::En, Language::Ar];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Language::Fr => "fr",
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// English name used inside model instructions.
    pub fn prompt_name(self) -> &'static str {
        match self {
            Language::Fr => "French",
            Language::En => "English",
            Language::Ar => "Arabic",
        }
    }

    /// Whether text in this language is laid out right-to-left.
    pub fn is_rtl(self) -> bool {
        matches!(self, Language::Ar)
    }

    pub fn messages(self) -> &'static Messages {
        match self {
            Language::Fr => &FR,
            Language::En => &EN,
            Language::Ar => &AR,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = MindMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" | "french" | "français" => Ok(Language::Fr),
            "en" | "english" => Ok(Language::En),
            "ar" | "arabic" => Ok(Language::Ar),
            other => Err(MindMapError::InvalidConfig(format!(
                "unknown language '{other}' (expected fr, en or ar)"
            ))),
        }
    }
}

/// Localized user-facing strings.
#[derive(Debug)]
pub struct Messages {
    pub analyzing: &'static str,
    pub analyzing_sub: &'static str,
    /// Rotated by the CLI spinner while a generation is in flight.
    pub analyzing_messages: [&'static str; 4],
    pub error: &'static str,
    pub format_error: &'static str,
    pub read_error: &'static str,
    pub busy: &'static str,
    pub slide: &'static str,
    pub of: &'static str,
    pub key_points: &'static str,
    pub introduction: &'static str,
    pub conclusion: &'static str,
    pub upload_title: &'static str,
    pub upload_text: &'static str,
    pub view_title: &'static str,
    pub view_text: &'static str,
}

static FR: Messages = Messages {
    analyzing: "Analyse en cours...",
    analyzing_sub: "Notre IA génère vos fiches de révision.",
    analyzing_messages: [
        "Lecture du document...",
        "Analyse des concepts clés...",
        "Création de votre carte mentale...",
        "Presque terminé...",
    ],
    error: "Erreur lors de l'analyse.",
    format_error: "Format non supporté.",
    read_error: "Erreur de lecture du fichier.",
    busy: "Une analyse est déjà en cours.",
    slide: "Slide",
    of: "sur",
    key_points: "Points Clés",
    introduction: "Introduction",
    conclusion: "Conclusion",
    upload_title: "Bienvenue sur Nodqra !",
    upload_text: "Commencez par uploader votre cours, PDF, ou article de recherche. Notre IA va l'analyser et créer des fiches de révision instantanément.",
    view_title: "Mode Révision",
    view_text: "Naviguez entre les cartes en glissant (swipe) ou avec les flèches. Chaque carte contient un résumé et des points clés essentiels.",
};

static EN: Messages = Messages {
    analyzing: "Analyzing...",
    analyzing_sub: "Our AI is generating your revision notes.",
    analyzing_messages: [
        "Reading your document...",
        "Analyzing key concepts...",
        "Building your mind map...",
        "Almost there...",
    ],
    error: "Analysis error.",
    format_error: "Unsupported format.",
    read_error: "File read error.",
    busy: "An analysis is already in progress.",
    slide: "Slide",
    of: "of",
    key_points: "Key Points",
    introduction: "Introduction",
    conclusion: "Conclusion",
    upload_title: "Welcome to Nodqra!",
    upload_text: "Start by uploading your lecture notes, PDF, or research paper. Our AI will analyze it and create revision cards instantly.",
    view_title: "Revision Mode",
    view_text: "Navigate through cards by swiping or using arrows. Each card contains a summary and essential key points.",
};

static AR: Messages = Messages {
    analyzing: "جاري التحليل...",
    analyzing_sub: "يقوم الذكاء الاصطناعي بإنشاء بطاقات المراجعة الخاصة بك.",
    analyzing_messages: [
        "قراءة المستند...",
        "تحليل المفاهيم الرئيسية...",
        "بناء خريطتك الذهنية...",
        "لحظات قليلة...",
    ],
    error: "خطأ في التحليل.",
    format_error: "صيغة غير مدعومة.",
    read_error: "خطأ في قراءة الملف.",
    busy: "هناك تحليل قيد التنفيذ بالفعل.",
    slide: "شريحة",
    of: "من",
    key_points: "النقاط الرئيسية",
    introduction: "مقدمة",
    conclusion: "خاتمة",
    upload_title: "مرحباً بك في Nodqra!",
    upload_text: "ابدأ برفع محاضراتك، ملفات PDF، أو أوراقك البحثية. سيقوم الذكاء الاصطناعي بتحليلها وإنشاء بطاقات مراجعة فوراً.",
    view_title: "وضع المراجعة",
    view_text: "تصفح البطاقات عن طريق السحب أو استخدام الأسهم. تحتوي كل بطاقة على ملخص ونقاط رئيسية.",
};
