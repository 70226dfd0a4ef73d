use std::collections::HashMap;
use std::path::Path;

use candle_core::{DType, Device, IndexOp, Module, Tensor, D};
use candle_nn::{linear, ops::softmax, Linear, VarBuilder};
use candle_transformers::models::distilbert::{Config, DistilBertModel};
use hf_hub::api::sync::{Api, ApiRepo};
use hf_hub::{Repo, RepoType};
use log::{debug, info, warn};
use serde::Deserialize;
use tokenizers::models::wordpiece::WordPiece;
use tokenizers::normalizers::bert::BertNormalizer;
use tokenizers::pre_tokenizers::bert::BertPreTokenizer;
use tokenizers::processors::bert::BertProcessing;
use tokenizers::{Model, Tokenizer};

use crate::error::{InferenceError, Result};
use crate::models::{Label, PredictionResult};

pub const DEFAULT_MODEL_ID: &str = "distilbert/distilbert-base-uncased-finetuned-sst-2-english";
pub const DEFAULT_REVISION: &str = "main";

/// A loaded text classifier that returns its single best label.
///
/// Implementations are shared across actix workers and must be usable
/// through `&self` from several blocking threads at once.
pub trait SentimentClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<PredictionResult>;

    fn model_id(&self) -> &str;
}

/// Hub coordinates of the weights and of the tokenizer.
///
/// The tokenizer may live in another repo; many older BERT-family
/// checkpoints only ship `vocab.txt`.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSource {
    pub model_id: String,
    pub revision: String,
    pub tokenizer_id: String,
}

impl Default for ModelSource {
    fn default() -> Self {
        ModelSource {
            model_id: DEFAULT_MODEL_ID.to_string(),
            revision: DEFAULT_REVISION.to_string(),
            tokenizer_id: DEFAULT_MODEL_ID.to_string(),
        }
    }
}

/// DistilBERT with the sequence-classification head used by the sst-2 checkpoints.
pub struct DistilBertClassifier {
    model: DistilBertModel,
    pre_classifier: Linear,
    classifier: Linear,
    tokenizer: Tokenizer,
    labels: Vec<Label>,
    device: Device,
    model_id: String,
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    dim: usize,
    #[serde(default)]
    id2label: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TokenizerConfigJson {
    #[serde(default = "lowercase_by_default")]
    do_lower_case: bool,
}

fn lowercase_by_default() -> bool {
    true
}

impl DistilBertClassifier {
    /// Downloads (or reuses the hub cache for) the model and builds it on the CPU.
    pub fn load(source: &ModelSource) -> Result<Self> {
        let device = Device::Cpu;
        let api = Api::new()?;
        let model_repo = api.repo(Repo::with_revision(
            source.model_id.clone(),
            RepoType::Model,
            source.revision.clone(),
        ));

        let config_str = std::fs::read_to_string(model_repo.get("config.json")?)?;
        let config: Config = serde_json::from_str(&config_str)?;
        let head: ClassifierConfigJson = serde_json::from_str(&config_str)?;
        let labels = labels_in_id_order(&head.id2label)?;

        let tokenizer = if source.tokenizer_id == source.model_id {
            fetch_tokenizer(&model_repo)?
        } else {
            fetch_tokenizer(&api.model(source.tokenizer_id.clone()))?
        };

        let weights = model_repo
            .get("model.safetensors")
            .or_else(|_| model_repo.get("pytorch_model.bin"))?;
        let vb = if weights.extension().is_some_and(|e| e == "safetensors") {
            unsafe { VarBuilder::from_mmaped_safetensors(&[&weights], DType::F32, &device)? }
        } else {
            VarBuilder::from_pth(&weights, DType::F32, &device)?
        };

        Self::from_parts(vb, &config, head.dim, tokenizer, labels, &source.model_id)
    }

    /// Builds the classifier from already-resolved weights and tokenizer.
    ///
    /// `vb` must be rooted at the checkpoint top level, where the encoder sits
    /// under `distilbert.` next to `pre_classifier` and `classifier`.
    pub fn from_parts(
        vb: VarBuilder,
        config: &Config,
        dim: usize,
        tokenizer: Tokenizer,
        labels: Vec<Label>,
        model_id: &str,
    ) -> Result<Self> {
        let device = vb.device().clone();
        let model = DistilBertModel::load(vb.pp("distilbert"), config)?;
        let pre_classifier = linear(dim, dim, vb.pp("pre_classifier"))?;
        let classifier = linear(dim, labels.len(), vb.pp("classifier"))?;

        info!(
            "Loaded {} ({} labels: {})",
            model_id,
            labels.len(),
            labels.iter().map(Label::as_str).collect::<Vec<_>>().join(", ")
        );

        Ok(Self {
            model,
            pre_classifier,
            classifier,
            tokenizer,
            labels,
            device,
            model_id: model_id.to_string(),
        })
    }

    fn probabilities(&self, text: &str) -> Result<Vec<f32>> {
        let tokens = self.tokenizer.encode(text, true).map_err(|e| {
            InferenceError::Tokenization(format!(
                "Tokenization failed on '{}': {}",
                text.chars().take(50).collect::<String>(),
                e
            ))
        })?;

        let input_ids = Tensor::new(tokens.get_ids(), &self.device)?.unsqueeze(0)?;
        // A single unpadded sequence: nothing is masked out.
        let attention_mask = Tensor::zeros((1, tokens.len()), DType::U8, &self.device)?;

        let hidden = self.model.forward(&input_ids, &attention_mask)?;
        let pooled = hidden.i((.., 0))?;
        let pooled = self.pre_classifier.forward(&pooled)?.relu()?;
        let logits = self.classifier.forward(&pooled)?;

        let probs = softmax(&logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;
        Ok(probs)
    }
}

impl SentimentClassifier for DistilBertClassifier {
    fn classify(&self, text: &str) -> Result<PredictionResult> {
        let probs = self.probabilities(text)?;
        let result = best_label(&self.labels, &probs)?;
        debug!("Classified {} chars as {} ({:.4})", text.len(), result.label, result.score);
        Ok(result)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Prefers a serialized `tokenizer.json`, else rebuilds the BERT tokenizer from `vocab.txt`.
fn fetch_tokenizer(repo: &ApiRepo) -> Result<Tokenizer> {
    match repo.get("tokenizer.json") {
        Ok(path) => Tokenizer::from_file(&path).map_err(|e| {
            InferenceError::Tokenization(format!(
                "Failed to load tokenizer from '{}': {}",
                path.display(),
                e
            ))
        }),
        Err(e) => {
            warn!("No tokenizer.json ({}), building WordPiece from vocab.txt", e);
            let vocab = repo.get("vocab.txt")?;
            let lowercase = match repo.get("tokenizer_config.json") {
                Ok(path) => {
                    serde_json::from_str::<TokenizerConfigJson>(&std::fs::read_to_string(path)?)?
                        .do_lower_case
                }
                Err(_) => lowercase_by_default(),
            };
            wordpiece_tokenizer(&vocab, lowercase)
        }
    }
}

/// BERT-style tokenizer: normalizer, whitespace/punctuation split, WordPiece,
/// and `[CLS] ... [SEP]` framing.
pub fn wordpiece_tokenizer(vocab: &Path, lowercase: bool) -> Result<Tokenizer> {
    let tokenization = |msg: String| InferenceError::Tokenization(msg);

    let vocab_path = vocab
        .to_str()
        .ok_or_else(|| tokenization(format!("non UTF-8 vocab path '{}'", vocab.display())))?;
    let wordpiece = WordPiece::from_file(vocab_path)
        .unk_token("[UNK]".to_string())
        .build()
        .map_err(|e| tokenization(format!("Failed to read vocab '{vocab_path}': {e}")))?;

    let special = |token: &str| {
        wordpiece
            .token_to_id(token)
            .ok_or_else(|| tokenization(format!("vocab '{vocab_path}' has no {token} token")))
    };
    let cls = special("[CLS]")?;
    let sep = special("[SEP]")?;

    let mut tokenizer = Tokenizer::new(wordpiece);
    tokenizer
        .with_normalizer(Some(BertNormalizer::new(true, true, None, lowercase)))
        .with_pre_tokenizer(Some(BertPreTokenizer))
        .with_post_processor(Some(BertProcessing::new(
            ("[SEP]".to_string(), sep),
            ("[CLS]".to_string(), cls),
        )));
    Ok(tokenizer)
}

/// Orders `id2label` by numeric id so position `i` is the label of logit `i`.
fn labels_in_id_order(id2label: &HashMap<String, String>) -> Result<Vec<Label>> {
    if id2label.is_empty() {
        return Err(InferenceError::ModelConfig(
            "config.json has no id2label mapping".to_string(),
        ));
    }

    let mut entries = id2label
        .iter()
        .map(|(id, name)| {
            let id: usize = id.parse().map_err(|_| {
                InferenceError::ModelConfig(format!("label id '{id}' is not an integer"))
            })?;
            let label = name.parse::<Label>().map_err(InferenceError::ModelConfig)?;
            Ok((id, label))
        })
        .collect::<Result<Vec<_>>>()?;
    entries.sort_by_key(|(id, _)| *id);

    for (expected, (id, _)) in entries.iter().enumerate() {
        if *id != expected {
            return Err(InferenceError::ModelConfig(format!(
                "label ids must be contiguous from 0, missing {expected}"
            )));
        }
    }

    Ok(entries.into_iter().map(|(_, label)| label).collect())
}

/// Picks the highest-probability class. Ties go to the lower id.
fn best_label(labels: &[Label], probs: &[f32]) -> Result<PredictionResult> {
    if labels.len() != probs.len() {
        return Err(InferenceError::ModelConfig(format!(
            "model produced {} scores for {} labels",
            probs.len(),
            labels.len()
        )));
    }

    let (idx, score) = probs
        .iter()
        .copied()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
            Some((_, bp)) if bp >= p => best,
            _ => Some((i, p)),
        })
        .ok_or_else(|| InferenceError::ModelConfig("model produced no scores".to_string()))?;

    if !score.is_finite() {
        return Err(InferenceError::Execution(format!(
            "model produced a non-finite score ({score})"
        )));
    }

    Ok(PredictionResult {
        label: labels[idx],
        score: score.clamp(0.0, 1.0),
    })
}
