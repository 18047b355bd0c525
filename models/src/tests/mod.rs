mod envelope;
mod masking;
mod notice;
