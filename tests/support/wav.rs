use std::io::Cursor;

/// Encode interleaved-by-closure stereo frames as 16-bit PCM WAV bytes.
pub fn stereo_wav_bytes(
    sample_rate: u32,
    frames: usize,
    frame: impl Fn(usize) -> (f32, f32),
) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("create wav writer");
        for index in 0..frames {
            let (left, right) = frame(index);
            writer.write_sample(to_i16(left)).expect("write left");
            writer.write_sample(to_i16(right)).expect("write right");
        }
        writer.finalize().expect("finalize wav");
    }
    cursor.into_inner()
}

/// A 440 Hz tone at half scale, identical on both channels.
pub fn sine_frame(sample_rate: u32) -> impl Fn(usize) -> (f32, f32) {
    move |index| {
        let t = index as f32 / sample_rate as f32;
        let value = 0.5 * (2.0 * std::f32::consts::PI * 440.0 * t).sin();
        (value, value)
    }
}

/// Three equal-length plateaus so the chosen window can be told apart.
pub fn plateau_frame(sample_rate: u32, seconds_per_plateau: usize) -> impl Fn(usize) -> (f32, f32) {
    let plateau = sample_rate as usize * seconds_per_plateau;
    move |index| match index / plateau {
        0 => (0.1, 0.1),
        1 => (0.5, 0.5),
        _ => (0.9, 0.9),
    }
}

fn to_i16(value: f32) -> i16 {
    (value.clamp(-1.0, 1.0) * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16
}
