// ============================================================
// Layer 5 — 2D U-Net
// ============================================================
// A compact encoder/decoder with skip connections producing one
// logit per pixel. Two pooling stages, so spatial dimensions
// must be divisible by 4.
//
//   enc1 ──────────────────────────► cat ─ dec1 ─ head
//     │ pool                          ▲
//   enc2 ───────────► cat ─ dec2 ─ up1
//     │ pool           ▲
//   bottleneck ───── up2
//
// Reference: Ronneberger et al. (2015) U-Net
//            Burn Book §3 (Building Blocks)

use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::relu,
};

#[derive(Config, Debug)]
pub struct Unet2DConfig {
    /// Input channels (grayscale: 1)
    pub channels: usize,
    /// Output classes (binary segmentation: 1 logit map)
    pub num_classes: usize,
    /// Filters at the first encoder stage; doubled per stage
    #[config(default = 16)]
    pub base_filters: usize,
}

impl Unet2DConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Unet2D<B> {
        let f = self.base_filters;
        Unet2D {
            enc1: DoubleConv::init(self.channels, f, device),
            enc2: DoubleConv::init(f, f * 2, device),
            bottleneck: DoubleConv::init(f * 2, f * 4, device),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
            up2: ConvTranspose2dConfig::new([f * 4, f * 2], [2, 2])
                .with_stride([2, 2])
                .init(device),
            dec2: DoubleConv::init(f * 4, f * 2, device),
            up1: ConvTranspose2dConfig::new([f * 2, f], [2, 2])
                .with_stride([2, 2])
                .init(device),
            dec1: DoubleConv::init(f * 2, f, device),
            head: Conv2dConfig::new([f, self.num_classes], [1, 1]).init(device),
        }
    }
}

/// Two 3x3 same-padded convolutions, each followed by ReLU.
#[derive(Module, Debug)]
pub struct DoubleConv<B: Backend> {
    conv1: Conv2d<B>,
    conv2: Conv2d<B>,
}

impl<B: Backend> DoubleConv<B> {
    fn init(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv = |cin, cout| {
            Conv2dConfig::new([cin, cout], [3, 3])
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device)
        };
        Self {
            conv1: conv(in_channels, out_channels),
            conv2: conv(out_channels, out_channels),
        }
    }

    fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = relu(self.conv1.forward(x));
        relu(self.conv2.forward(x))
    }
}

#[derive(Module, Debug)]
pub struct Unet2D<B: Backend> {
    enc1: DoubleConv<B>,
    enc2: DoubleConv<B>,
    bottleneck: DoubleConv<B>,
    pool: MaxPool2d,
    up2: ConvTranspose2d<B>,
    dec2: DoubleConv<B>,
    up1: ConvTranspose2d<B>,
    dec1: DoubleConv<B>,
    head: Conv2d<B>,
}

impl<B: Backend> Unet2D<B> {
    /// images: [batch, channels, H, W] → logits: [batch, num_classes, H, W]
    /// H and W must be divisible by 4.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        let e1 = self.enc1.forward(images);
        let e2 = self.enc2.forward(self.pool.forward(e1.clone()));
        let b = self.bottleneck.forward(self.pool.forward(e2.clone()));

        let d2 = self
            .dec2
            .forward(Tensor::cat(vec![e2, self.up2.forward(b)], 1));
        let d1 = self
            .dec1
            .forward(Tensor::cat(vec![e1, self.up1.forward(d2)], 1));

        self.head.forward(d1)
    }
}
