//! Message bundles and per-request locale resolution.
//!
//! Bundles are compiled in. A request picks its locale from the `lang` query
//! parameter, then `Accept-Language`, then the configured default. Error
//! responses are rendered in English by `AppError` and re-rendered here once
//! the request locale is known.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::ACCEPT_LANGUAGE, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use crate::errors::ErrorPayload;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    En,
    Fr,
    Es,
}

/// Every user-facing message the API can return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    InvalidEmail,
    PasswordTooShort,
    EmailTaken,
    SignupSuccess,
    LoginSuccess,
    InvalidCredentials,
    CompanyFieldsRequired,
    PlaceholderTaken,
    CompanyCreated,
    NoFilesUploaded,
    TooManyFiles,
    FileTooLarge,
    UnsupportedFileType,
    MalformedUpload,
    MalformedBody,
    UploadSuccess,
    UploadFailed,
    FileNameRequired,
    FileNotFound,
    Unauthorized,
    StorageFailure,
    ServerError,
}

impl Locale {
    /// Parses a language tag such as `fr`, `fr-CA` or `ES`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            "es" => Some(Locale::Es),
            _ => None,
        }
    }

    /// Picks the highest-weighted supported tag of an `Accept-Language` value.
    pub fn from_accept_language(value: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, &str)> = value
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.trim().split(';');
                let tag = pieces.next()?.trim();
                if tag.is_empty() {
                    return None;
                }
                let quality = pieces
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .and_then(|q| q.parse::<f32>().ok())
                    .unwrap_or(1.0);
                Some((quality, tag))
            })
            .collect();
        // Stable sort keeps header order among equal weights.
        ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
        ranked
            .into_iter()
            .filter(|(q, _)| *q > 0.0)
            .find_map(|(_, tag)| Locale::from_tag(tag))
    }

    pub fn text(self, message: Message) -> &'static str {
        match self {
            Locale::En => english(message),
            Locale::Fr => french(message),
            Locale::Es => spanish(message),
        }
    }
}

fn english(message: Message) -> &'static str {
    use Message::*;
    match message {
        InvalidEmail => "Invalid email format",
        PasswordTooShort => "Password must be at least 6 characters long",
        EmailTaken => "An account with this email already exists",
        SignupSuccess => "User registered successfully",
        LoginSuccess => "Logged in successfully",
        InvalidCredentials => "Invalid email or password",
        CompanyFieldsRequired => "Name, address and placeholder are required",
        PlaceholderTaken => "A company with this placeholder already exists",
        CompanyCreated => "Company created successfully",
        NoFilesUploaded => "No files uploaded",
        TooManyFiles => "Too many files: at most 10 files per upload",
        FileTooLarge => "File exceeds the 2MB size limit",
        UnsupportedFileType => "Unsupported file type: only PDF, text and Word documents are accepted",
        MalformedUpload => "Malformed multipart upload",
        MalformedBody => "Malformed request body",
        UploadSuccess => "Files uploaded successfully",
        UploadFailed => "Failed to store uploaded file",
        FileNameRequired => "fileName query parameter is required",
        FileNotFound => "File not found",
        Unauthorized => "Authentication required",
        StorageFailure => "A storage error occurred",
        ServerError => "Server error",
    }
}

fn french(message: Message) -> &'static str {
    use Message::*;
    match message {
        InvalidEmail => "Format d'adresse e-mail invalide",
        PasswordTooShort => "Le mot de passe doit contenir au moins 6 caractères",
        EmailTaken => "Un compte existe déjà avec cette adresse e-mail",
        SignupSuccess => "Utilisateur inscrit avec succès",
        LoginSuccess => "Connexion réussie",
        InvalidCredentials => "E-mail ou mot de passe invalide",
        CompanyFieldsRequired => "Le nom, l'adresse et l'identifiant sont obligatoires",
        PlaceholderTaken => "Une entreprise utilise déjà cet identifiant",
        CompanyCreated => "Entreprise créée avec succès",
        NoFilesUploaded => "Aucun fichier envoyé",
        TooManyFiles => "Trop de fichiers : 10 fichiers maximum par envoi",
        FileTooLarge => "Le fichier dépasse la limite de 2 Mo",
        UnsupportedFileType => "Type de fichier non pris en charge : seuls les PDF, textes et documents Word sont acceptés",
        MalformedUpload => "Envoi multipart mal formé",
        MalformedBody => "Corps de requête mal formé",
        UploadSuccess => "Fichiers envoyés avec succès",
        UploadFailed => "Échec de l'enregistrement du fichier envoyé",
        FileNameRequired => "Le paramètre fileName est obligatoire",
        FileNotFound => "Fichier introuvable",
        Unauthorized => "Authentification requise",
        StorageFailure => "Une erreur de stockage est survenue",
        ServerError => "Erreur serveur",
    }
}

fn spanish(message: Message) -> &'static str {
    use Message::*;
    match message {
        InvalidEmail => "Formato de correo electrónico no válido",
        PasswordTooShort => "La contraseña debe tener al menos 6 caracteres",
        EmailTaken => "Ya existe una cuenta con este correo electrónico",
        SignupSuccess => "Usuario registrado correctamente",
        LoginSuccess => "Sesión iniciada correctamente",
        InvalidCredentials => "Correo electrónico o contraseña no válidos",
        CompanyFieldsRequired => "El nombre, la dirección y el identificador son obligatorios",
        PlaceholderTaken => "Ya existe una empresa con este identificador",
        CompanyCreated => "Empresa creada correctamente",
        NoFilesUploaded => "No se subieron archivos",
        TooManyFiles => "Demasiados archivos: como máximo 10 por envío",
        FileTooLarge => "El archivo supera el límite de 2 MB",
        UnsupportedFileType => "Tipo de archivo no admitido: solo se aceptan PDF, texto y documentos de Word",
        MalformedUpload => "Envío multipart mal formado",
        MalformedBody => "Cuerpo de la solicitud mal formado",
        UploadSuccess => "Archivos subidos correctamente",
        UploadFailed => "No se pudo guardar el archivo subido",
        FileNameRequired => "El parámetro fileName es obligatorio",
        FileNotFound => "Archivo no encontrado",
        Unauthorized => "Autenticación requerida",
        StorageFailure => "Se produjo un error de almacenamiento",
        ServerError => "Error del servidor",
    }
}

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

fn resolve(uri: &Uri, headers: &HeaderMap, fallback: Locale) -> Locale {
    let from_query = Query::<LangQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.lang)
        .and_then(|tag| Locale::from_tag(&tag));

    from_query
        .or_else(|| {
            headers
                .get(ACCEPT_LANGUAGE)
                .and_then(|v| v.to_str().ok())
                .and_then(Locale::from_accept_language)
        })
        .unwrap_or(fallback)
}

/// Middleware: resolves the request locale, exposes it to handlers and
/// re-renders error bodies in that locale.
pub async fn resolve_locale(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let locale = resolve(request.uri(), request.headers(), state.config.default_locale);
    request.extensions_mut().insert(locale);

    let response = next.run(request).await;
    match response.extensions().get::<ErrorPayload>() {
        Some(payload) if locale != Locale::En => {
            let payload = payload.clone();
            payload.into_localized_response(locale)
        }
        _ => response,
    }
}

/// Handlers read the locale set by [`resolve_locale`]; outside that stage the
/// default bundle is used.
#[async_trait]
impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Locale>().copied().unwrap_or_default())
    }
}
