pub mod wav;

pub use wav::{load_wav, load_wav_file};
